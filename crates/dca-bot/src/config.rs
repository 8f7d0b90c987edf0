//! Bot configuration, resolved once before any network call.

use dca_core::config::{parse_or, ConfigSource, DcaSettings};
use dca_core::error::Result;
use dca_exchange::GmoCoinConfig;

pub const DRY_RUN_KEY: &str = "DCA_DRY_RUN";

#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Investment cap, symbol and policy
    pub dca: DcaSettings,

    /// Exchange endpoints, credentials and timeout
    pub exchange: GmoCoinConfig,

    /// Compute and log the plan but place no order
    pub dry_run: bool,
}

impl BotConfig {
    pub fn load(source: &dyn ConfigSource) -> Result<Self> {
        Ok(Self {
            dca: DcaSettings::from_source(source)?,
            exchange: GmoCoinConfig::from_source(source)?,
            dry_run: parse_or(source, DRY_RUN_KEY, false)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dca_core::config::{MapSource, MAX_INVEST_KEY};
    use dca_core::{DcaError, InvestmentPolicy};
    use dca_exchange::{API_KEY_KEY, SECRET_KEY_KEY};
    use rust_decimal_macros::dec;

    fn complete() -> MapSource {
        MapSource::new()
            .with(MAX_INVEST_KEY, "10000")
            .with(API_KEY_KEY, "key")
            .with(SECRET_KEY_KEY, "s3cr3t-value")
    }

    #[test]
    fn test_load_complete_config() {
        let config = BotConfig::load(&complete()).unwrap();
        assert_eq!(config.dca.investment_cap, dec!(10000));
        assert_eq!(config.dca.policy, InvestmentPolicy::ModuloWithFloor);
        assert!(!config.dry_run);
        assert!(!format!("{config:?}").contains("s3cr3t-value"));
    }

    #[test]
    fn test_dry_run_flag() {
        let config = BotConfig::load(&complete().with(DRY_RUN_KEY, "true")).unwrap();
        assert!(config.dry_run);
        assert!(matches!(
            BotConfig::load(&complete().with(DRY_RUN_KEY, "maybe")),
            Err(DcaError::Config(_))
        ));
    }

    #[test]
    fn test_each_required_key_is_enforced() {
        for missing in [MAX_INVEST_KEY, API_KEY_KEY, SECRET_KEY_KEY] {
            let source = complete().with(missing, "");
            let err = BotConfig::load(&source).unwrap_err();
            assert!(matches!(err, DcaError::Config(ref msg) if msg.contains(missing)), "{err}");
        }
    }
}
