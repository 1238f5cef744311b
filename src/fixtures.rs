// canned OAI-PMH responses shared by the unit tests.

pub fn arxiv_record(id: &str, created: &str, doi: Option<&str>) -> String {
    let doi = doi
        .map(|d| format!("<doi>{}</doi>", d))
        .unwrap_or_default();
    format!(
        concat!(
            "<record><header><identifier>oai:arXiv.org:{id}</identifier>",
            "<datestamp>{created}</datestamp><setSpec>physics:quant-ph</setSpec></header>",
            "<metadata><arXiv xmlns=\"http://arxiv.org/OAI/arXiv/\">",
            "<id>{id}</id><created>{created}</created>",
            "<authors><author><keyname>Doe</keyname><forenames>Jane</forenames></author></authors>",
            "<title>Title of {id}</title>",
            "<categories>quant-ph cond-mat.str-el quant-ph</categories>",
            "{doi}",
            "<abstract>\n  Abstract of {id} with &lt;markup&gt; &amp; entities.\n</abstract>",
            "</arXiv></metadata></record>"
        ),
        id = id,
        created = created,
        doi = doi
    )
}

pub fn deleted_record(id: &str) -> String {
    format!(
        concat!(
            "<record><header status=\"deleted\"><identifier>oai:arXiv.org:{}</identifier>",
            "<datestamp>2018-03-15</datestamp></header></record>"
        ),
        id
    )
}

pub fn list_records_page(records: &[String], token: Option<&str>) -> String {
    let token = token
        .map(|t| format!(
            "<resumptionToken cursor=\"0\" completeListSize=\"2500\">{}</resumptionToken>",
            t
        ))
        .unwrap_or_default();
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<OAI-PMH xmlns=\"http://www.openarchives.org/OAI/2.0/\" ",
            "xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\n",
            "<responseDate>2018-06-02T00:00:00Z</responseDate>\n",
            "<request verb=\"ListRecords\">http://export.arxiv.org/oai2</request>\n",
            "<ListRecords>\n{}\n{}\n</ListRecords>\n",
            "</OAI-PMH>\n"
        ),
        records.join("\n"),
        token
    )
}

pub fn oai_error(code: &str, message: &str) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<OAI-PMH xmlns=\"http://www.openarchives.org/OAI/2.0/\">",
            "<responseDate>2018-06-02T00:00:00Z</responseDate>",
            "<request verb=\"ListRecords\">http://export.arxiv.org/oai2</request>",
            "<error code=\"{}\">{}</error>",
            "</OAI-PMH>"
        ),
        code,
        message
    )
}
