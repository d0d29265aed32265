//! Parses the JSON bank statements exported by online banking.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};
use time::Date;

use crate::{
    Error,
    account::AccountId,
    transaction::{ClearedStatus, Direction, Transaction, TransactionBuilder},
};

#[derive(Debug, Deserialize)]
struct StatementDocument {
    #[serde(rename = "GetBankAccountDetailsRs")]
    details: StatementDetails,
}

#[derive(Debug, Deserialize)]
struct StatementDetails {
    #[serde(rename = "BodyRs")]
    body: StatementBody,
}

#[derive(Debug, Deserialize)]
struct StatementBody {
    #[serde(rename = "bankAccountTransactions", default)]
    transactions: Vec<StatementRecord>,
}

/// One line of a bank statement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRecord {
    pub txn_date: Date,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub descr: String,
    #[serde(deserialize_with = "decimal_from_string_or_number")]
    pub txn_amount: Decimal,
    #[serde(default, deserialize_with = "optional_decimal_from_string_or_number")]
    pub balance: Option<Decimal>,
}

impl StatementRecord {
    /// The ledger entry for this record, filed against `account_id`.
    ///
    /// Negative amounts are money leaving the account.
    pub fn to_builder(&self, account_id: AccountId) -> TransactionBuilder {
        let direction = if self.txn_amount < Decimal::ZERO {
            Direction::Outflow
        } else {
            Direction::Inflow
        };

        Transaction::build(
            self.txn_amount.abs(),
            direction,
            self.txn_date,
            &self.descr,
            account_id,
        )
        .memo(&self.code)
        .cleared_status(ClearedStatus::Cleared)
    }
}

/// Parse a bank statement into its records.
///
/// # Errors
/// Returns [Error::InvalidImport] if `json` is not a bank statement.
pub fn parse_statement(json: &[u8]) -> Result<Vec<StatementRecord>, Error> {
    serde_json::from_slice::<StatementDocument>(json)
        .map(|document| document.details.body.transactions)
        .map_err(|error| Error::InvalidImport(error.to_string()))
}

fn parse_decimal<E: de::Error>(text: &str) -> Result<Decimal, E> {
    let text = text.trim();

    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| E::custom(format!("\"{text}\" is not a decimal number")))
}

fn decimal_from_string_or_number<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => parse_decimal(&text),
        serde_json::Value::Number(number) => parse_decimal(&number.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

fn optional_decimal_from_string_or_number<'de, D>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(text) if text.trim().is_empty() => Ok(None),
        serde_json::Value::String(text) => parse_decimal(&text).map(Some),
        serde_json::Value::Number(number) => parse_decimal(&number.to_string()).map(Some),
        other => Err(de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        transaction::{ClearedStatus, Direction},
    };

    use super::parse_statement;

    const STATEMENT: &str = r#"{
        "GetBankAccountDetailsRs": {
            "BodyRs": {
                "bankAccountTransactions": [
                    {
                        "txnDate": "2025-03-01",
                        "code": "EFTPOS",
                        "descr": "Countdown",
                        "txnAmount": "-45.10",
                        "balance": "954.90"
                    },
                    {
                        "txnDate": "2025-03-02",
                        "code": "CREDIT",
                        "descr": "Salary",
                        "txnAmount": 2000.5,
                        "balance": 2955.4
                    }
                ]
            }
        }
    }"#;

    #[test]
    fn accepts_strings_and_numbers() {
        let records = parse_statement(STATEMENT.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].txn_amount, dec!(-45.10));
        assert_eq!(records[0].balance, Some(dec!(954.90)));
        assert_eq!(records[1].txn_amount, dec!(2000.5));
        assert_eq!(records[1].txn_date, date!(2025 - 03 - 02));
    }

    #[test]
    fn negative_amount_becomes_cleared_outflow() {
        let records = parse_statement(STATEMENT.as_bytes()).unwrap();

        let builder = records[0].to_builder(7);

        assert_eq!(builder.amount, dec!(45.10));
        assert_eq!(builder.direction, Direction::Outflow);
        assert_eq!(builder.payee, "Countdown");
        assert_eq!(builder.memo, "EFTPOS");
        assert_eq!(builder.account_id, 7);
        assert_eq!(builder.category_id, None);
        assert_eq!(builder.cleared_status, ClearedStatus::Cleared);
        assert_eq!(records[1].to_builder(7).direction, Direction::Inflow);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let result = parse_statement(b"{\"GetBankAccountDetailsRs\": [");

        assert!(matches!(result, Err(Error::InvalidImport(_))));
    }

    #[test]
    fn bad_amount_is_rejected() {
        let json = r#"{"GetBankAccountDetailsRs":{"BodyRs":{"bankAccountTransactions":[
            {"txnDate":"2025-03-01","code":"","descr":"x","txnAmount":"lots"}
        ]}}}"#;

        assert!(matches!(
            parse_statement(json.as_bytes()),
            Err(Error::InvalidImport(_))
        ));
    }
}
