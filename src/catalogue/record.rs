//! SRU search responses and MARCXchange records
//!
//! The BnF SRU endpoint wraps UNIMARC records serialized as MARCXchange in
//! an SRW `searchRetrieveResponse`. Only the record count and the fields of
//! the first record are kept.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use crate::error::{missing_root, unclosed_element, Error, Result};

pub const SRW_NAMESPACE: &str = "http://www.loc.gov/zing/srw/";
pub const MARCXCHANGE_NAMESPACE: &str = "info:lc/xmlns/marcxchange-v2";
pub const MARC21_SLIM_NAMESPACE: &str = "http://www.loc.gov/MARC21/slim";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlField {
    pub tag: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfield {
    pub code: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataField {
    pub tag: String,
    pub subfields: Vec<Subfield>,
}

impl DataField {
    /// First subfield with `code`
    pub fn subfield(&self, code: &str) -> Option<&str> {
        self.subfields
            .iter()
            .find(|subfield| subfield.code == code)
            .map(|subfield| subfield.value.as_str())
    }
}

/// One bibliographic record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarcRecord {
    pub control_fields: Vec<ControlField>,
    pub data_fields: Vec<DataField>,
}

impl MarcRecord {
    pub fn control_field(&self, tag: &str) -> Option<&str> {
        self.control_fields
            .iter()
            .find(|field| field.tag == tag)
            .map(|field| field.value.as_str())
    }

    /// Data fields with `tag`, in record order
    pub fn data_fields<'a, 't>(
        &'a self,
        tag: &'t str,
    ) -> impl Iterator<Item = &'a DataField> + use<'a, 't> {
        self.data_fields.iter().filter(move |field| field.tag == tag)
    }

    /// First `code` subfield found in any `tag` field, in record order.
    pub fn first_subfield(&self, tag: &str, code: &str) -> Option<&str> {
        self.data_fields(tag).find_map(|field| field.subfield(code))
    }
}

/// A parsed `searchRetrieveResponse`
#[derive(Debug, Clone, Default)]
pub struct SearchResponse {
    pub number_of_records: u64,
    pub record: Option<MarcRecord>,
}

impl SearchResponse {
    pub fn is_match(&self) -> bool {
        self.number_of_records > 0
    }

    /// The first record, if the search matched.
    pub fn into_record(self) -> Option<MarcRecord> {
        if self.is_match() {
            Some(self.record.unwrap_or_default())
        } else {
            None
        }
    }
}

fn is_marc_namespace(ns: &[u8]) -> bool {
    ns == MARCXCHANGE_NAMESPACE.as_bytes() || ns == MARC21_SLIM_NAMESPACE.as_bytes()
}

enum Scope {
    Srw,
    Marc,
    Other,
}

fn scope(resolved: &ResolveResult) -> Scope {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) if *ns == SRW_NAMESPACE.as_bytes() => Scope::Srw,
        ResolveResult::Bound(Namespace(ns)) if is_marc_namespace(ns) => Scope::Marc,
        _ => Scope::Other,
    }
}

fn attribute(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    let xml_error = |source: quick_xml::Error| Error::Xml {
        file: "SRU response".to_string(),
        source,
    };
    for attr in e.attributes() {
        let attr = attr.map_err(|e| xml_error(e.into()))?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value().map_err(xml_error)?.into_owned()));
        }
    }
    Ok(None)
}

/// Where the text of the current element goes
enum Capture {
    None,
    RecordCount,
    Control(String),
    Subfield(String),
}

/// Parse an SRU `searchRetrieveResponse` carrying MARCXchange records.
pub fn parse_search_response(xml: &str) -> Result<SearchResponse> {
    let xml_error = |source: quick_xml::Error| Error::Xml {
        file: "SRU response".to_string(),
        source,
    };

    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut number_of_records: Option<u64> = None;
    let mut record: Option<MarcRecord> = None;
    let mut current: Option<MarcRecord> = None;
    let mut field: Option<DataField> = None;
    let mut capture = Capture::None;
    let mut text = String::new();
    // Local names of the open elements
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut seen_root = false;

    loop {
        let (resolved, event) = reader.read_resolved_event().map_err(xml_error)?;
        match event {
            Event::Start(e) => {
                seen_root = true;
                let local = e.local_name();
                open.push(local.as_ref().to_vec());
                match (scope(&resolved), local.as_ref()) {
                    (Scope::Srw, b"numberOfRecords") => capture = Capture::RecordCount,
                    (Scope::Marc, b"record") if record.is_none() => {
                        current = Some(MarcRecord::default());
                    }
                    (Scope::Marc, b"controlfield") if current.is_some() => {
                        capture = Capture::Control(attribute(&e, b"tag")?.unwrap_or_default());
                    }
                    (Scope::Marc, b"datafield") if current.is_some() => {
                        field = Some(DataField {
                            tag: attribute(&e, b"tag")?.unwrap_or_default(),
                            subfields: Vec::new(),
                        });
                    }
                    (Scope::Marc, b"subfield") if field.is_some() => {
                        capture = Capture::Subfield(attribute(&e, b"code")?.unwrap_or_default());
                    }
                    _ => {}
                }
                text.clear();
            }
            Event::Empty(e) => {
                seen_root = true;
                let local = e.local_name();
                if let (Scope::Marc, b"subfield", Some(field)) =
                    (scope(&resolved), local.as_ref(), field.as_mut())
                {
                    field.subfields.push(Subfield {
                        code: attribute(&e, b"code")?.unwrap_or_default(),
                        value: String::new(),
                    });
                }
            }
            Event::Text(e) => {
                if !matches!(capture, Capture::None) {
                    text.push_str(&e.unescape().map_err(xml_error)?);
                }
            }
            Event::End(e) => {
                open.pop();
                let local = e.local_name();
                match (scope(&resolved), local.as_ref()) {
                    (Scope::Srw, b"numberOfRecords") => {
                        let count = text.trim().parse::<u64>().map_err(|_| {
                            Error::Catalogue(format!("invalid numberOfRecords {:?}", text.trim()))
                        })?;
                        number_of_records = Some(count);
                    }
                    (Scope::Marc, b"record") => {
                        if let Some(done) = current.take() {
                            record = Some(done);
                        }
                    }
                    (Scope::Marc, b"controlfield") => {
                        if let (Capture::Control(tag), Some(current)) = (&capture, current.as_mut()) {
                            current.control_fields.push(ControlField {
                                tag: tag.clone(),
                                value: text.clone(),
                            });
                        }
                    }
                    (Scope::Marc, b"datafield") => {
                        if let (Some(done), Some(current)) = (field.take(), current.as_mut()) {
                            current.data_fields.push(done);
                        }
                    }
                    (Scope::Marc, b"subfield") => {
                        if let (Capture::Subfield(code), Some(field)) = (&capture, field.as_mut()) {
                            field.subfields.push(Subfield {
                                code: code.clone(),
                                value: text.clone(),
                            });
                        }
                    }
                    _ => {}
                }
                capture = Capture::None;
                text.clear();
            }
            Event::Eof => {
                if let Some(name) = open.last() {
                    return Err(xml_error(unclosed_element(name)));
                }
                if !seen_root {
                    return Err(xml_error(missing_root()));
                }
                break;
            }
            _ => {}
        }
    }

    let number_of_records = number_of_records
        .ok_or_else(|| Error::Catalogue("response has no numberOfRecords".to_string()))?;

    Ok(SearchResponse {
        number_of_records,
        record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<srw:searchRetrieveResponse xmlns:srw="http://www.loc.gov/zing/srw/">
  <srw:version>1.2</srw:version>
  <srw:numberOfRecords>1</srw:numberOfRecords>
  <srw:records>
    <srw:record>
      <srw:recordData>
        <mxc:record xmlns:mxc="info:lc/xmlns/marcxchange-v2" format="Unimarc" type="Bibliographic">
          <mxc:controlfield tag="003">http://catalogue.bnf.fr/ark:/12148/cb1</mxc:controlfield>
          <mxc:datafield tag="200" ind1="1" ind2=" ">
            <mxc:subfield code="a">Roman de la Rose</mxc:subfield>
            <mxc:subfield code="b">Manuscrit</mxc:subfield>
          </mxc:datafield>
          <mxc:datafield tag="701" ind1=" " ind2="1">
            <mxc:subfield code="a">Lorris</mxc:subfield>
            <mxc:subfield code="b"/>
          </mxc:datafield>
        </mxc:record>
      </srw:recordData>
    </srw:record>
  </srw:records>
</srw:searchRetrieveResponse>"#;

    #[test]
    fn test_parse_record() {
        let response = parse_search_response(RESPONSE).unwrap();
        assert!(response.is_match());
        let record = response.into_record().unwrap();
        assert_eq!(
            record.control_field("003"),
            Some("http://catalogue.bnf.fr/ark:/12148/cb1")
        );
        assert_eq!(record.first_subfield("200", "a"), Some("Roman de la Rose"));
        assert_eq!(record.first_subfield("200", "b"), Some("Manuscrit"));
        assert_eq!(record.first_subfield("701", "b"), Some(""));
        assert_eq!(record.first_subfield("210", "a"), None);
    }

    #[test]
    fn test_zero_records() {
        let xml = r#"<srw:searchRetrieveResponse xmlns:srw="http://www.loc.gov/zing/srw/">
            <srw:numberOfRecords>0</srw:numberOfRecords>
        </srw:searchRetrieveResponse>"#;
        let response = parse_search_response(xml).unwrap();
        assert!(!response.is_match());
        assert!(response.into_record().is_none());
    }

    #[test]
    fn test_missing_count_is_an_error() {
        let xml = r#"<srw:searchRetrieveResponse xmlns:srw="http://www.loc.gov/zing/srw/"/>"#;
        assert!(matches!(
            parse_search_response(xml),
            Err(Error::Catalogue(_))
        ));
    }

    #[test]
    fn test_first_subfield_skips_fields_without_code() {
        let record = MarcRecord {
            control_fields: Vec::new(),
            data_fields: vec![
                DataField {
                    tag: "210".to_string(),
                    subfields: vec![Subfield {
                        code: "c".to_string(),
                        value: "Vérard".to_string(),
                    }],
                },
                DataField {
                    tag: "210".to_string(),
                    subfields: vec![Subfield {
                        code: "a".to_string(),
                        value: "Paris".to_string(),
                    }],
                },
            ],
        };
        assert_eq!(record.first_subfield("210", "a"), Some("Paris"));
    }

    #[test]
    fn test_lookup_tag_does_not_outlive_the_call() {
        let record = parse_search_response(RESPONSE)
            .unwrap()
            .into_record()
            .unwrap();
        let title = {
            let tag = String::from("200");
            record.first_subfield(&tag, "a")
        };
        assert_eq!(title, Some("Roman de la Rose"));
    }

    #[test]
    fn test_truncated_response_is_an_error() {
        let cut = RESPONSE.find("<mxc:datafield tag=\"701\"").unwrap();
        assert!(matches!(
            parse_search_response(&RESPONSE[..cut]),
            Err(Error::Xml { .. })
        ));
    }

    #[test]
    fn test_empty_body_is_an_error() {
        assert!(matches!(parse_search_response(""), Err(Error::Xml { .. })));
        assert!(matches!(
            parse_search_response("Service Unavailable"),
            Err(Error::Xml { .. })
        ));
    }
}
