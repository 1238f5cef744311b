// Namespace-aware parsing of one OAI-PMH `ListRecords` page. the response is
// read into a small element tree first, then records are pulled out of it by
// (namespace, local name) pairs from the caller's `Namespaces`.

use chrono::NaiveDate;
use quick_xml::{
    events::{BytesStart, Event},
    name::{Namespace, ResolveResult},
    NsReader
};
use tracing::debug;

use crate::{
    config::Namespaces,
    error::{HarvestError, Result},
    model::PaperRecord
};

// OAI-PMH error code for an empty selection.
const NO_RECORDS_MATCH: &str = "noRecordsMatch";

/// Records of one page plus the cursor for the next one, if any.
#[derive(Debug, Default, PartialEq)]
pub struct Page {
    pub records: Vec<PaperRecord>,
    pub resumption_token: Option<ResumptionToken>
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumptionToken {
    pub value: String,
    pub complete_list_size: Option<u64>,
    pub cursor: Option<u64>
}

pub fn parse_page(xml: &str, namespaces: &Namespaces, date_format: &str) -> Result<Page> {
    let root = build_tree(xml)?;
    let oai = namespaces.oai.as_str();

    if let Some(error) = root.find(oai, "error") {
        let code = error.attribute("code").unwrap_or_default();
        if code == NO_RECORDS_MATCH {
            debug!("server reported no records for this selection");
            return Ok(Page::default());
        }
        return Err(HarvestError::Protocol {
            code: code.to_string(),
            message: error.text.trim().to_string()
        });
    }

    let list = root.require(oai, "ListRecords")?;
    let mut records = Vec::new();
    for record in list.find_all(oai, "record") {
        let header = record.require(oai, "header")?;
        // deleted records keep their header but carry no metadata block.
        if header.attribute("status") == Some("deleted") {
            let identifier = header.find(oai, "identifier")
                .map(|e| e.text.trim())
                .unwrap_or_default();
            debug!(identifier, "skipping deleted record");
            continue;
        }
        records.push(parse_record(record, namespaces, date_format)?);
    }

    let resumption_token = list.find(oai, "resumptionToken")
        .and_then(ResumptionToken::from_element);

    Ok(Page { records, resumption_token })
}

impl ResumptionToken {
    // an element with no text is the final page marker, not an empty cursor.
    fn from_element(element: &Element) -> Option<Self> {
        let value = element.text.trim();
        if value.is_empty() {
            return None;
        }
        Some(ResumptionToken {
            value: value.to_string(),
            complete_list_size: element.attribute("completeListSize").and_then(|v| v.parse().ok()),
            cursor: element.attribute("cursor").and_then(|v| v.parse().ok())
        })
    }
}

fn parse_record(record: &Element, namespaces: &Namespaces, date_format: &str) -> Result<PaperRecord> {
    let arxiv = namespaces.arxiv.as_str();
    let info = record
        .require(namespaces.oai.as_str(), "metadata")?
        .require(arxiv, "arXiv")?;

    let created_raw = info.require(arxiv, "created")?.text.as_str();
    let created = parse_created(created_raw, date_format)?;

    let categories = info.require(arxiv, "categories")?.text
        .split_whitespace()
        .map(String::from)
        .collect::<Vec<_>>();

    // multiple DOIs: the first is the paper, later ones are usually errata.
    let doi = info.find(arxiv, "doi")
        .and_then(|e| e.text.split_whitespace().next())
        .map(String::from);

    Ok(PaperRecord::new(
        info.require(arxiv, "title")?.text.clone(),
        info.require(arxiv, "abstract")?.text.trim().to_string(),
        categories,
        created,
        info.require(arxiv, "id")?.text.clone(),
        doi
    ))
}

pub fn parse_created(raw: &str, date_format: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, date_format)
        .map_err(|e| HarvestError::malformed(format!("created date `{}`: {}", raw, e)))
}

// Element Tree

#[derive(Debug, Default)]
struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>
}

impl Element {
    fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    fn find(&self, namespace: &str, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.is(namespace, name))
    }

    fn find_all<'a>(&'a self, namespace: &'a str, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.is(namespace, name))
    }

    fn require(&self, namespace: &str, name: &str) -> Result<&Element> {
        self.find(namespace, name).ok_or_else(|| {
            HarvestError::malformed(format!("missing <{}> in <{}>", name, self.name))
        })
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn build_tree(xml: &str) -> Result<Element> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let namespace = match resolved {
            ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
            _ => None
        };
        match event {
            Event::Start(e) => stack.push(open_element(namespace, &e)?),
            Event::Empty(e) => {
                let element = open_element(namespace, &e)?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop()
                    .ok_or_else(|| HarvestError::malformed("unbalanced closing tag"))?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::Text(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(HarvestError::malformed("document ended inside an open element"));
    }
    root.ok_or_else(|| HarvestError::malformed("document has no root element"))
}

fn open_element(namespace: Option<String>, start: &BytesStart) -> Result<Element> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        namespace,
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes,
        ..Element::default()
    })
}

fn close_element(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(HarvestError::malformed("more than one root element")),
    }
    Ok(())
}

// end Element Tree
