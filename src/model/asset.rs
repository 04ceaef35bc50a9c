use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Institution that issued an asset (bank, company, treasury, fund manager)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issuer {
    pub id: i64,
    pub name: String,
}

/// Person who owns holdings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Owner {
    pub id: i64,
    pub name: String,
}

/// Brokerage where a holding is custodied
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Brokerage {
    pub id: i64,
    pub name: String,
}

/// Fixed income instrument types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FixedIncomeType {
    Cdb,       // Certificado de Depósito Bancário
    Lci,       // Letra de Crédito Imobiliário
    Lca,       // Letra de Crédito do Agronegócio
    Cri,       // Certificado de Recebíveis Imobiliários
    Cra,       // Certificado de Recebíveis do Agronegócio
    Debenture, // Corporate bond
    Tesouro,   // Government bonds (Tesouro Direto)
}

impl FixedIncomeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixedIncomeType::Cdb => "CDB",
            FixedIncomeType::Lci => "LCI",
            FixedIncomeType::Lca => "LCA",
            FixedIncomeType::Cri => "CRI",
            FixedIncomeType::Cra => "CRA",
            FixedIncomeType::Debenture => "DEBENTURE",
            FixedIncomeType::Tesouro => "TESOURO",
        }
    }
}

/// How a fixed income asset yields
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum YieldType {
    PreFixed,  // Rate fixed at purchase
    PostFixed, // Percentage of CDI
    Inflation, // IPCA + spread
}

impl YieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            YieldType::PreFixed => "PRE_FIXED",
            YieldType::PostFixed => "POST_FIXED",
            YieldType::Inflation => "INFLATION",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableIncomeType {
    NationalStock,  // Ações
    RealEstateFund, // FII
    Etf,
    Bdr,
}

impl VariableIncomeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableIncomeType::NationalStock => "NATIONAL_STOCK",
            VariableIncomeType::RealEstateFund => "REAL_ESTATE_FUND",
            VariableIncomeType::Etf => "ETF",
            VariableIncomeType::Bdr => "BDR",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundType {
    Pension, // Previdência
    Stock,
    Multimarket,
    FixedIncome,
}

impl FundType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundType::Pension => "PENSION",
            FundType::Stock => "STOCK",
            FundType::Multimarket => "MULTIMARKET",
            FundType::FixedIncome => "FIXED_INCOME",
        }
    }
}

/// When invested money can be withdrawn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Liquidity {
    Daily,
    OnMaturity,
    DaysAfterSale(u32),
}

impl Liquidity {
    pub fn describe(&self) -> String {
        match self {
            Liquidity::Daily => "Daily".to_string(),
            Liquidity::OnMaturity => "On maturity".to_string(),
            Liquidity::DaysAfterSale(days) => format!("D+{}", days),
        }
    }
}

/// Top-level asset classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetCategory {
    FixedIncome,
    VariableIncome,
    InvestmentFund,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::FixedIncome => "FIXED_INCOME",
            AssetCategory::VariableIncome => "VARIABLE_INCOME",
            AssetCategory::InvestmentFund => "INVESTMENT_FUND",
        }
    }
}

impl FromStr for AssetCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "FIXED_INCOME" | "RENDA_FIXA" | "FIXED" => Ok(AssetCategory::FixedIncome),
            "VARIABLE_INCOME" | "RENDA_VARIAVEL" | "VARIABLE" => Ok(AssetCategory::VariableIncome),
            "INVESTMENT_FUND" | "FUNDO" | "FUND" => Ok(AssetCategory::InvestmentFund),
            _ => Err(()),
        }
    }
}

/// Category-specific asset data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "category", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetKind {
    FixedIncome {
        subtype: FixedIncomeType,
        yield_type: YieldType,
        /// Annual rate in percent (or spread over IPCA for inflation-linked)
        contracted_yield: Decimal,
        /// Percentage of CDI for post-fixed assets
        #[serde(default)]
        cdi_relative_yield: Option<Decimal>,
        maturity_date: NaiveDate,
    },
    VariableIncome {
        subtype: VariableIncomeType,
        ticker: String,
    },
    InvestmentFund {
        subtype: FundType,
        #[serde(default)]
        ticker: Option<String>,
    },
}

impl AssetKind {
    pub fn category(&self) -> AssetCategory {
        match self {
            AssetKind::FixedIncome { .. } => AssetCategory::FixedIncome,
            AssetKind::VariableIncome { .. } => AssetCategory::VariableIncome,
            AssetKind::InvestmentFund { .. } => AssetCategory::InvestmentFund,
        }
    }

    pub fn subtype_str(&self) -> &'static str {
        match self {
            AssetKind::FixedIncome { subtype, .. } => subtype.as_str(),
            AssetKind::VariableIncome { subtype, .. } => subtype.as_str(),
            AssetKind::InvestmentFund { subtype, .. } => subtype.as_str(),
        }
    }
}

/// Asset (fixed income, stock, fund)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub id: i64,
    pub name: String,
    pub issuer_id: i64,
    #[serde(flatten)]
    pub kind: AssetKind,
    pub liquidity: Liquidity,
    #[serde(default)]
    pub observations: Option<String>,
}

impl Asset {
    pub fn category(&self) -> AssetCategory {
        self.kind.category()
    }

    pub fn ticker(&self) -> Option<&str> {
        match &self.kind {
            AssetKind::VariableIncome { ticker, .. } => Some(ticker.as_str()),
            AssetKind::InvestmentFund { ticker, .. } => ticker.as_deref(),
            AssetKind::FixedIncome { .. } => None,
        }
    }

    /// Ticker when the asset trades on the exchange, otherwise its name
    pub fn display_name(&self) -> &str {
        self.ticker().unwrap_or(&self.name)
    }

    pub fn maturity_date(&self) -> Option<NaiveDate> {
        match &self.kind {
            AssetKind::FixedIncome { maturity_date, .. } => Some(*maturity_date),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fixed_income_asset_from_json() {
        let json = r#"{
            "id": 1,
            "name": "CDB Banco Inter 2027",
            "issuer_id": 3,
            "category": "FIXED_INCOME",
            "subtype": "CDB",
            "yield_type": "POST_FIXED",
            "contracted_yield": "0",
            "cdi_relative_yield": "110",
            "maturity_date": "2027-06-15",
            "liquidity": "ON_MATURITY"
        }"#;

        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.category(), AssetCategory::FixedIncome);
        assert_eq!(asset.display_name(), "CDB Banco Inter 2027");
        assert_eq!(
            asset.maturity_date(),
            NaiveDate::from_ymd_opt(2027, 6, 15)
        );
        match asset.kind {
            AssetKind::FixedIncome {
                cdi_relative_yield, ..
            } => assert_eq!(cdi_relative_yield, Some(dec!(110))),
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_variable_income_uses_ticker_for_display() {
        let json = r#"{
            "id": 2,
            "name": "Petrobras PN",
            "issuer_id": 1,
            "category": "VARIABLE_INCOME",
            "subtype": "NATIONAL_STOCK",
            "ticker": "PETR4",
            "liquidity": {"DAYS_AFTER_SALE": 2}
        }"#;

        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.display_name(), "PETR4");
        assert_eq!(asset.liquidity, Liquidity::DaysAfterSale(2));
        assert_eq!(asset.liquidity.describe(), "D+2");
        assert_eq!(asset.kind.subtype_str(), "NATIONAL_STOCK");
    }

    #[test]
    fn test_fund_without_ticker_falls_back_to_name() {
        let json = r#"{
            "id": 3,
            "name": "Previdência XP",
            "issuer_id": 2,
            "category": "INVESTMENT_FUND",
            "subtype": "PENSION",
            "liquidity": "DAILY"
        }"#;

        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.ticker(), None);
        assert_eq!(asset.display_name(), "Previdência XP");
        assert_eq!(asset.maturity_date(), None);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            "fixed-income".parse::<AssetCategory>(),
            Ok(AssetCategory::FixedIncome)
        );
        assert_eq!(
            "renda_variavel".parse::<AssetCategory>(),
            Ok(AssetCategory::VariableIncome)
        );
        assert_eq!("FUND".parse::<AssetCategory>(), Ok(AssetCategory::InvestmentFund));
        assert!("crypto".parse::<AssetCategory>().is_err());
    }
}
