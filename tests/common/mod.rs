#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::path::PathBuf;
use storeviz::loader::load_table;
use storeviz::table::Table;
use storeviz::upload::UploadedFile;
use tempfile::TempDir;

pub const STORE_CSV: &str = "\
date,region,product,sales,units
2024-01-03,North,Widget,120.5,3
2024-01-01,South,Gadget,80.0,2
2024-01-02,North,Gadget,45.25,1
2024-01-04,East,Widget,200.0,5
2024-01-05,South,Widget,99.75,4
";

/// Parse CSV text as if it had been uploaded as `store.csv`.
pub fn csv_table(csv: &str) -> Table {
    load_table(&UploadedFile::from_bytes("store.csv", csv.as_bytes().to_vec())).unwrap()
}

pub fn store_table() -> Table {
    csv_table(STORE_CSV)
}

/// Write `contents` to `name` inside a fresh temp dir. Keep the dir alive while using the path.
pub fn write_temp_file(name: &str, contents: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

/// A one-sheet workbook: a header row, then one row per entry of `regions`/`sales`.
pub fn store_xlsx(regions: &[&str], sales: &[f64]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "region").unwrap();
    worksheet.write_string(0, 1, "sales").unwrap();
    for (i, (region, value)) in regions.iter().zip(sales).enumerate() {
        let row = i as u32 + 1;
        worksheet.write_string(row, 0, *region).unwrap();
        worksheet.write_number(row, 1, *value).unwrap();
    }
    workbook.save_to_buffer().unwrap()
}
