use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a customer paid for a sale.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Pix,
    Credit,
    Debit,
    Check,
}

serde_plain::derive_display_from_serialize!(PaymentMethod);
serde_plain::derive_fromstr_from_deserialize!(PaymentMethod);

impl PaymentMethod {
    /// Reads a payment method from a sheet cell. Matching ignores case and accents and accepts
    /// the Portuguese names (`Dinheiro`, `Crédito`, `Débito`, `Cheque`). Anything else is `Cash`.
    pub fn from_cell(value: &str) -> PaymentMethod {
        let folded: String = value
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| match c {
                'á' | 'à' | 'â' | 'ã' => 'a',
                'é' | 'ê' => 'e',
                'í' => 'i',
                'ó' | 'ô' | 'õ' => 'o',
                'ú' => 'u',
                'ç' => 'c',
                other => other,
            })
            .collect();
        match folded.as_str() {
            "cash" | "dinheiro" => PaymentMethod::Cash,
            "pix" => PaymentMethod::Pix,
            "credit" | "credito" | "cartao de credito" => PaymentMethod::Credit,
            "debit" | "debito" | "cartao de debito" => PaymentMethod::Debit,
            "check" | "cheque" => PaymentMethod::Check,
            _ => {
                if !folded.is_empty() {
                    debug!("Unknown payment method '{value}', using Cash");
                }
                PaymentMethod::Cash
            }
        }
    }
}
