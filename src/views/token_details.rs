//! Token detail surface.
//!
//! Backs the per-token detail screen: metadata sections, the shortened
//! contract address, and clipboard copy with its transient confirmation.
//! The clipboard itself belongs to the host platform.

/// Clipboard collaborator owned by the host platform.
pub trait Clipboard {
    /// Place `text` on the system clipboard.
    fn set_text(&mut self, text: &str);
}

/// Transient confirmation shown after a clipboard write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Message presented to the user.
    pub message: String,

    /// Auto-dismiss delay in milliseconds.
    pub autodismiss_ms: u64,
}

/// Actions the detail surface can request of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailRequest {
    /// Stop tracking this token in the wallet.
    HideToken,
}

/// Token metadata backing the detail surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDetails {
    /// Display balance in token units.
    pub balance: String,

    /// Fiat value of the balance, already formatted by the host.
    pub fiat_value: String,

    /// Contract address of the token.
    pub address: String,

    /// Decimal places the token uses.
    pub decimals: u8,

    /// Name of the network the token lives on.
    pub network: String,

    /// Token lists that include this token.
    pub token_lists: Vec<String>,
}

impl TokenDetails {
    /// Shortened contract address: the first six and last four characters.
    ///
    /// Addresses too short to shorten come back whole.
    #[must_use]
    pub fn short_address(&self) -> String {
        let address = &self.address;
        if address.len() <= 10 {
            return address.clone();
        }

        match (address.get(..6), address.get(address.len() - 4..)) {
            (Some(head), Some(tail)) => format!("{head}...{tail}"),
            _ => address.clone(),
        }
    }

    /// Copy the full contract address via the host clipboard.
    ///
    /// Returns the confirmation alert for the host to flash.
    pub fn copy_address(&self, clipboard: &mut impl Clipboard) -> Alert {
        clipboard.set_text(&self.address);
        Alert {
            message: "Token contract address copied to clipboard".to_string(),
            autodismiss_ms: 1500,
        }
    }

    /// Request that the host stop tracking this token.
    #[must_use]
    pub const fn hide(&self) -> DetailRequest {
        DetailRequest::HideToken
    }

    /// Headline balance line, token units with the fiat value alongside.
    #[must_use]
    pub fn balance_summary(&self) -> String {
        format!("{} ({})", self.balance, self.fiat_value)
    }

    /// Labelled sections rendered below the balance, in display order.
    #[must_use]
    pub fn sections(&self) -> Vec<(String, String)> {
        vec![
            ("Token contract address".to_string(), self.short_address()),
            ("Token decimal".to_string(), self.decimals.to_string()),
            ("Network".to_string(), self.network.clone()),
            ("Token lists".to_string(), self.token_lists.join(", ")),
        ]
    }
}
