///! QRZ.com XML lookup service
///!
///! Keeps a session key (cached on disk between runs) and looks up the
///! grid locator of a callsign.

pub mod client;
pub mod parser;
pub mod types;

pub use client::{LocatorLookup, QrzXmlClient};
pub use parser::parse_xml_response;
pub use types::{XmlCallsign, XmlResponse, XmlSession};
