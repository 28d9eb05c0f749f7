///! XML lookup response types

/// `<Session>` block of a QRZ.com XML answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlSession {
    pub key: Option<String>,
    pub error: Option<String>,
}

/// The few `<Callsign>` fields we care about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlCallsign {
    pub grid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlResponse {
    /// `None` when the answer carried no `<Session>` block at all
    pub session: Option<XmlSession>,
    pub callsign: Option<XmlCallsign>,
}

impl XmlResponse {
    pub fn session_error(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.error.as_deref())
    }

    pub fn session_key(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.key.as_deref())
    }
}
