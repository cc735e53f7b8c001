//! Shared fixtures for unit tests: a small labelled resume corpus and
//! generated PDF / DOCX documents.

use std::io::{Cursor, Write};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use zip::write::SimpleFileOptions;

use crate::model::ModelArtifacts;
use crate::training::{train, Dataset, TrainingOptions};

pub const FIXTURE_CSV: &str = "\
ID,Title,Skills,Summary,Years
1,Software Engineer,\"Rust, Kubernetes, Docker, Git\",Backend developer building microservices and CI pipelines,5
2,Software Engineer,\"Go, Docker, Kubernetes, REST APIs\",Backend engineer shipping microservices with Git workflows,3
3,Software Engineer,\"Rust, Git, CI pipelines, Linux\",Developer building backend APIs and deployments on Kubernetes,7
4,Software Engineer,\"Docker, Kubernetes, microservices\",Backend developer automating deployments and Git pipelines,2
5,Software Engineer,\"Rust, Go, APIs, Docker\",Software developer building microservices backend on Kubernetes,4
6,Registered Nurse,\"Patient care, medication administration\",Registered nurse in ICU ward,6
7,Registered Nurse,\"ICU, triage, patient care\",Registered nurse providing bedside care on hospital ward,9
8,Registered Nurse,\"Medication administration, wound care\",Nurse caring for patients in intensive care ICU,4
9,Registered Nurse,\"Patient assessment, ward care\",Registered nurse coordinating patient care and medication,11
10,Registered Nurse,\"Nursing, ICU, medication\",Hospital nurse delivering patient care on surgical ward,3
11,Accountant,\"Ledger reconciliation, audit\",Accountant preparing tax returns and financial statements,8
12,Accountant,\"Tax, bookkeeping, audit\",Certified accountant managing general ledger and payroll,5
13,Accountant,\"Financial statements, ledger\",Accountant handling audit preparation and tax filings,2
14,Accountant,\"Payroll, invoices, tax\",Staff accountant reconciling ledger accounts and invoices,6
15,Accountant,\"Audit, budgeting, ledger\",Senior accountant leading tax audit and budgeting,12
16,Chef,\"Menu planning, pastry\",Head chef running kitchen and menu design,10
17,Chef,\"Kitchen management, sauces\",Sous chef supervising kitchen line and pastry,4
18,Chef,\"Pastry, baking, menu\",Pastry chef creating desserts and seasonal menu,6
19,Chef,\"Food safety, kitchen, grill\",Line chef cooking grill dishes in busy kitchen,2
20,Chef,\"Menu costing, catering\",Executive chef planning menu and kitchen staffing,15
21,Data Scientist,\"Python, pandas, statistics\",Data scientist training machine learning models,4
22,Data Scientist,\"Machine learning, regression\",Data scientist analysing datasets with Python,3
23,Data Scientist,\"Statistics, Jupyter, pandas\",Scientist building predictive models and experiments,6
24,Data Scientist,\"Python, deep learning, statistics\",Data scientist forecasting demand with regression models,2
25,Data Scientist,\"Pandas, visualization, Python\",Data scientist presenting statistics and machine learning insights,5
26,Graphic Designer,\"Photoshop, Illustrator, typography\",Graphic designer creating branding and logos,7
27,Graphic Designer,\"Branding, layout, Illustrator\",Designer producing print layout and typography,3
28,Graphic Designer,\"Typography, Photoshop, logos\",Graphic designer crafting brand identity visuals,5
29,Astronaut,\"Orbit, spacewalk\",Astronaut trained for long duration mission,14
";

pub fn fixture_dataset() -> Dataset {
    Dataset::from_reader(FIXTURE_CSV.as_bytes()).unwrap()
}

/// A freshly trained model; every call gets a new model id.
pub fn fixture_artifacts() -> ModelArtifacts {
    train(&fixture_dataset(), &TrainingOptions::default())
        .unwrap()
        .artifacts
}

/// A minimal DOCX package with one body paragraph per entry. Empty entries
/// become `<w:p/>`.
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| {
            if p.is_empty() {
                "<w:p/>".to_string()
            } else {
                format!(
                    "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
                    xml_escape(p)
                )
            }
        })
        .collect();
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}</w:body></w:document>"
    );
    let content_types = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
        <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
        <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
        <Override PartName=\"/word/document.xml\" \
        ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
        </Types>";

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer.write_all(content_types.as_bytes()).unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A PDF with one page per entry, each drawn in Courier.
pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![50.into(), 750.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
