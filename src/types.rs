use serde::{Deserialize, Serialize};

/// numeric scheme identifier used by the nav data provider
pub type SchemeCode = u32;

/// how a mutual fund investment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentType {
    /// one-off purchase on the start date
    Lumpsum,
    /// systematic investment plan, monthly purchases
    Sip,
}

/// kind of a generated installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallmentType {
    Lumpsum,
    SipInstallment,
}

impl From<InvestmentType> for InstallmentType {
    fn from(value: InvestmentType) -> Self {
        match value {
            InvestmentType::Lumpsum => InstallmentType::Lumpsum,
            InvestmentType::Sip => InstallmentType::SipInstallment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&InvestmentType::Sip).unwrap(), "\"sip\"");
        assert_eq!(
            serde_json::to_string(&InstallmentType::SipInstallment).unwrap(),
            "\"sip-installment\""
        );
        let parsed: InvestmentType = serde_json::from_str("\"lumpsum\"").unwrap();
        assert_eq!(parsed, InvestmentType::Lumpsum);
    }
}
