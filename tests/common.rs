#![allow(dead_code)]

use std::io::{Cursor, Read};

use image::{DynamicImage, ImageFormat};
use mailmerge_server::merge::Row;
use zip::ZipArchive;

/// A solid PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

pub fn jane_doe(group: &str) -> Row {
    Row::new()
        .with("FullName", "Jane Doe")
        .with("City", "NYC")
        .with("Group", group)
}

pub fn person(name: &str, group: &str) -> Row {
    Row::new().with("FullName", name).with("Group", group)
}

/// Read one part out of a ZIP container as text.
pub fn zip_part(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let mut text = String::new();
    archive
        .by_name(name)
        .expect("part present")
        .read_to_string(&mut text)
        .expect("utf-8 part");
    text
}

pub fn zip_names(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    archive.file_names().map(str::to_string).collect()
}

pub fn zip_bytes(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let mut data = Vec::new();
    archive
        .by_name(name)
        .expect("entry present")
        .read_to_end(&mut data)
        .expect("readable entry");
    data
}
