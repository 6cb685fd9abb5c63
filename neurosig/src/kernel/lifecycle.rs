use super::ConfigError;

/// Constructor validation lifecycle shared by kernel structs.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, KernelLifecycle};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct SampleRateConfig {
        sf: f64,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct SampleRateKernel {
        dt: f64,
    }

    impl KernelLifecycle for SampleRateKernel {
        type Config = SampleRateConfig;

        fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
            if !(config.sf > 0.) {
                return Err(ConfigError::invalid(
                    "sf",
                    alloc::format!("must be > 0, got {}", config.sf),
                ));
            }
            Ok(Self { dt: 1. / config.sf })
        }
    }

    #[test]
    fn lifecycle_constructor_accepts_valid_config() {
        let kernel = SampleRateKernel::try_new(SampleRateConfig { sf: 4. }).expect("valid config");
        assert_eq!(kernel.dt, 0.25);
    }

    #[test]
    fn lifecycle_constructor_rejects_invalid_config() {
        let err = SampleRateKernel::try_new(SampleRateConfig { sf: 0. }).expect_err("invalid");
        assert_eq!(err, ConfigError::invalid("sf", "must be > 0, got 0"));
    }
}
