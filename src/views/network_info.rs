//! Network-switch education notice.
//!
//! Shown after the user switches networks. Classifies the active provider,
//! resolves the label identifying the new network, and builds the numbered
//! reminder lines. Dismissal is a plain close with no persisted marker.

/// How the active network provider is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkKind {
    /// The main production network.
    Mainnet,
    /// A named, built-in test network.
    Testnet,
    /// A user-supplied RPC endpoint.
    Rpc,
}

/// Active provider details supplied by the host's network controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProvider {
    /// User-chosen nickname; may be empty for built-in networks.
    pub nickname: String,

    /// Built-in network name, for example `mainnet` or `sepolia`.
    pub name: String,

    /// How the provider is reachable.
    pub kind: NetworkKind,

    /// Native currency ticker; unset for unrecognized custom networks.
    pub ticker: Option<String>,

    /// RPC endpoint the provider talks to.
    pub rpc_url: String,
}

/// View model for the notice shown after a network switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkNotice {
    provider: NetworkProvider,
}

impl NetworkNotice {
    /// Build the notice for the given provider.
    #[must_use]
    pub const fn new(provider: NetworkProvider) -> Self {
        Self { provider }
    }

    /// Whether the native currency of this network is unknown.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.provider.ticker.is_none()
    }

    /// Label identifying the network the user just switched to.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.provider.ticker.is_none() {
            if self.provider.nickname.is_empty() {
                return "Unknown network".to_string();
            }
            return self.provider.nickname.clone();
        }

        match self.provider.kind {
            NetworkKind::Rpc => self.provider.nickname.clone(),
            NetworkKind::Mainnet => self.provider.name.clone(),
            NetworkKind::Testnet => format!("{} test network", self.provider.name),
        }
    }

    /// Raw endpoint shown under the name for unrecognized networks.
    #[must_use]
    pub fn endpoint_note(&self) -> Option<&str> {
        if self.is_unknown() {
            Some(self.provider.rpc_url.as_str())
        } else {
            None
        }
    }

    /// The numbered things-to-keep-in-mind reminders.
    #[must_use]
    pub fn reminders(&self) -> Vec<String> {
        let currency = match (self.provider.kind, self.provider.ticker.as_deref()) {
            (NetworkKind::Rpc, None) => {
                "This is a private or custom network. Confirm its native currency before \
                 transacting."
                    .to_string()
            }
            (_, Some(ticker)) => {
                format!("The native currency here is {ticker}. It is what gas fees are paid in.")
            }
            (_, None) => {
                "The native currency of this network is unknown. Gas fees may not display \
                 correctly."
                    .to_string()
            }
        };

        vec![
            currency,
            "Your account address stays the same, but its assets belong to the selected \
             network only."
                .to_string(),
            "Tokens you hold on this network may need to be added before they appear."
                .to_string(),
        ]
    }

    /// Full display line buffer for the notice.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.push("You have switched networks".to_string());
        lines.push(self.display_name());
        if let Some(endpoint) = self.endpoint_note() {
            lines.push(endpoint.to_string());
        }
        lines.push(String::new());
        lines.push("Things to keep in mind:".to_string());

        for (number, reminder) in self.reminders().iter().enumerate() {
            lines.push(format!("{}. {reminder}", number + 1));
        }

        lines
    }
}
