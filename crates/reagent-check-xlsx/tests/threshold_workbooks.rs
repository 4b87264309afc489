//! Reading threshold workbooks the way spreadsheet software saves them

use std::io::{Cursor, Write};

use pretty_assertions::assert_eq;
use reagent_check_core::{CellValue, Sheet, ThresholdBook, ThresholdColumns, Workbook};
use reagent_check_xlsx::{XlsxReader, XlsxWriter};

const CONTENT_TYPES: &[u8] = br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

/// Build an XLSX package from (sheet name, sheet xml) pairs and a shared string table
fn package(sheets: &[(&str, &str)], shared_strings: &[&str]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES).unwrap();

        let mut workbook = String::from(
            r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
        );
        let mut rels = String::from(
            r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (i, (name, _)) in sheets.iter().enumerate() {
            workbook.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                name,
                i + 1,
                i + 1
            ));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }
        workbook.push_str("</sheets></workbook>");
        rels.push_str("</Relationships>");

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(workbook.as_bytes()).unwrap();
        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();

        if !shared_strings.is_empty() {
            let mut sst = String::from(
                r#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
            );
            for s in shared_strings {
                // Entries that are already markup (rich-text runs) go in as-is
                if s.starts_with('<') {
                    sst.push_str(&format!("<si>{}</si>", s));
                } else {
                    sst.push_str(&format!("<si><t>{}</t></si>", s));
                }
            }
            sst.push_str("</sst>");
            zip.start_file("xl/sharedStrings.xml", options).unwrap();
            zip.write_all(sst.as_bytes()).unwrap();
        }

        for (i, (_, xml)) in sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }

        zip.finish().unwrap();
    }
    buf
}

fn worksheet(rows: &str) -> String {
    format!(
        r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
        rows
    )
}

#[test]
fn reads_every_cell_kind() {
    let sheet = worksheet(
        r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
           <row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>40</v></c><c r="C2" t="b"><v>1</v></c></row>
           <row r="3"><c r="A3" t="inlineStr"><is><t>CRP</t></is></c><c r="B3"><f>10*2</f><v>20</v></c><c r="C3" t="e"><v>#N/A</v></c></row>
           <row r="5"><c r="A5" t="str"><f>"N"&amp;"a"</f><v>Na</v></c><c r="B5"/></row>"#,
    );
    let bytes = package(&[("AU1-1", &sheet)], &["Reagent Name", "Minimum Volume", "ALB"]);

    let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["AU1-1"]);

    let sheet = workbook.sheet(0).unwrap();
    assert_eq!(sheet.get(0, 0), Some(&CellValue::string("Reagent Name")));
    assert_eq!(sheet.get(1, 1), Some(&CellValue::Number(40.0)));
    assert_eq!(sheet.get(1, 2), Some(&CellValue::Boolean(true)));
    assert_eq!(sheet.get(2, 0), Some(&CellValue::string("CRP")));
    assert_eq!(sheet.get(2, 1), Some(&CellValue::Number(20.0)));
    assert_eq!(sheet.get(2, 2), Some(&CellValue::Error("#N/A".into())));
    assert_eq!(sheet.get(4, 0), Some(&CellValue::string("Na")));
    assert_eq!(sheet.get(4, 1), None);
}

#[test]
fn rich_text_runs_keep_their_spaces() {
    let sheet = worksheet(
        r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
           <row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>8</v></c></row>
           <row r="3"><c r="A3" t="inlineStr"><is><r><t>Anti</t></r><r><t xml:space="preserve"> TPO</t></r></is></c><c r="B3"><v>5</v></c></row>"#,
    );
    let bytes = package(
        &[("e801-1", &sheet)],
        &[
            "Test",
            "Min Volume",
            r#"<r><rPr><b/></rPr><t>Free</t></r><r><t xml:space="preserve"> T4</t></r><rPh sb="0" eb="1"><t>X</t></rPh>"#,
        ],
    );

    let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
    let sheet = workbook.sheet(0).unwrap();
    assert_eq!(sheet.get(1, 0), Some(&CellValue::string("Free T4")));
    assert_eq!(sheet.get(2, 0), Some(&CellValue::string("Anti TPO")));

    let book = ThresholdBook::from_workbook(&workbook, &ThresholdColumns::default()).unwrap();
    let table = book.default_table().unwrap();
    assert_eq!(table.get(&"free t4".into()).map(|t| t.minimum), Some(8.0));
    assert_eq!(table.get(&"ANTI TPO".into()).map(|t| t.minimum), Some(5.0));
}

#[test]
fn loads_one_threshold_table_per_analyzer_sheet() {
    let au1 = worksheet(
        r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
           <row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>40</v></c></row>
           <row r="3"><c r="A3" t="s"><v>3</v></c><c r="B3" t="s"><v>4</v></c></row>"#,
    );
    let e801 = worksheet(
        r#"<row r="2"><c r="A2" t="inlineStr"><is><t>Test</t></is></c><c r="B2" t="inlineStr"><is><t>MinVolume</t></is></c></row>
           <row r="3"><c r="A3" t="inlineStr"><is><t>TSH</t></is></c><c r="B3"><v>50.7</v></c></row>"#,
    );
    let notes = worksheet(r#"<row r="1"><c r="A1" t="inlineStr"><is><t>Owner</t></is></c></row>"#);

    let bytes = package(
        &[("AU1-1", &au1), ("Notes", &notes), ("e801", &e801)],
        &["Reagent Name", "Minimum Volume", "ALB", "GLU", "unknown"],
    );
    let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
    let book = ThresholdBook::from_workbook(&workbook, &ThresholdColumns::default()).unwrap();

    assert_eq!(book.analyzers(), vec!["AU1-1", "e801"]);
    let au1 = book.table("au1-1").unwrap();
    assert_eq!(au1.len(), 1);
    assert_eq!(au1.get(&"alb".into()).map(|t| t.minimum), Some(40.0));
    assert_eq!(
        book.table("E801").unwrap().get(&"tsh".into()).map(|t| t.minimum),
        Some(50.0)
    );
}

#[test]
fn written_reports_read_back() {
    let mut to_load = Sheet::new("Below Minimum");
    to_load.push_row(["Reagent Name", "Current Volume", "Minimum Volume", "Lot"]);
    to_load.push_row(vec![
        CellValue::from("T4 & FT4 <total>"),
        CellValue::from(35.0),
        CellValue::from(50.0),
        CellValue::from("  0042"),
    ]);
    let mut summary = Sheet::new("Summary");
    summary.push_row(["Metric", "Value"]);
    summary.push_row(vec![CellValue::from("Flag"), CellValue::from(true)]);

    let mut workbook = Workbook::new();
    workbook.add_sheet(to_load.clone());
    workbook.add_sheet(summary.clone());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");
    XlsxWriter::write_file(&workbook, &path).unwrap();

    let read = XlsxReader::read_file(&path).unwrap();
    assert_eq!(read.sheet_names(), vec!["Below Minimum", "Summary"]);
    let below = read.sheet(0).unwrap();
    assert_eq!(below.get(1, 0), Some(&CellValue::string("T4 & FT4 <total>")));
    assert_eq!(below.get(1, 1), Some(&CellValue::Number(35.0)));
    assert_eq!(read.sheet(1).unwrap(), &summary);
}
