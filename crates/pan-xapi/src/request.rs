//! Request construction for the XML management API.
//!
//! Every API call is a keyed request against the device's `/api/` endpoint,
//! distinguished by its `type` parameter. Requests carry their payload as
//! query parameters: an xpath for configuration access, an inline XML
//! fragment for operational commands and commits.

/// The kind of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Configuration read at an xpath.
    ConfigGet,
    /// Idempotent configuration element insertion at an xpath.
    ConfigSet,
    /// Operational command.
    Op,
    /// Commit of the staged configuration.
    Commit,
}

impl RequestKind {
    /// Get the wire name of the request kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ConfigGet | Self::ConfigSet => "config",
            Self::Op => "op",
            Self::Commit => "commit",
        }
    }
}

/// A typed XML API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XapiRequest {
    /// Read the configuration subtree at `xpath`.
    ConfigGet {
        /// The xpath to read.
        xpath: String,
    },
    /// Insert `element` under the configuration node at `xpath`.
    ///
    /// The device treats insertion of an already-present element as a no-op,
    /// so sets are idempotent.
    ConfigSet {
        /// The xpath to write under.
        xpath: String,
        /// The XML element fragment to insert.
        element: String,
    },
    /// Execute an operational command given as an inline XML fragment.
    Op {
        /// The command fragment.
        cmd: String,
    },
    /// Commit the staged configuration.
    Commit {
        /// The commit command fragment.
        cmd: String,
    },
}

impl XapiRequest {
    /// Create a configuration read request.
    pub fn config_get(xpath: impl Into<String>) -> Self {
        Self::ConfigGet {
            xpath: xpath.into(),
        }
    }

    /// Create a configuration set request.
    pub fn config_set(xpath: impl Into<String>, element: impl Into<String>) -> Self {
        Self::ConfigSet {
            xpath: xpath.into(),
            element: element.into(),
        }
    }

    /// Create an operational command request.
    pub fn op(cmd: impl Into<String>) -> Self {
        Self::Op { cmd: cmd.into() }
    }

    /// Create a commit request with a free-text description.
    pub fn commit(description: &str) -> Self {
        Self::Commit {
            cmd: format!("<commit><description>{description}</description></commit>"),
        }
    }

    /// Get the kind of this request.
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::ConfigGet { .. } => RequestKind::ConfigGet,
            Self::ConfigSet { .. } => RequestKind::ConfigSet,
            Self::Op { .. } => RequestKind::Op,
            Self::Commit { .. } => RequestKind::Commit,
        }
    }

    /// Render the request as API query parameters, excluding the key.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::ConfigGet { xpath } => vec![
                ("type", "config"),
                ("action", "get"),
                ("xpath", xpath.as_str()),
            ],
            Self::ConfigSet { xpath, element } => vec![
                ("type", "config"),
                ("action", "set"),
                ("xpath", xpath.as_str()),
                ("element", element.as_str()),
            ],
            Self::Op { cmd } => vec![("type", "op"), ("cmd", cmd.as_str())],
            Self::Commit { cmd } => vec![("type", "commit"), ("cmd", cmd.as_str())],
        }
    }
}
