//! Shared helpers for integration tests

#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use pdf_compare_rs::prelude::*;
use std::cell::Cell;
use std::fs;
use std::path::PathBuf;

/// Path of a file under `tests/fixtures`
pub fn fixture(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(relative)
}

pub fn read_fixture(relative: &str) -> Vec<u8> {
    fs::read(fixture(relative)).unwrap()
}

/// Backend that treats every `BT ... ET` line of a `%PDF-` document as one page
///
/// A page renders as a single row of pixels holding the bytes of its line, so
/// documents with the same text lines in the same order render identically,
/// whatever else they contain.
#[derive(Default)]
pub struct TextLineBackend {
    pub loads: Cell<usize>,
    pub closes: Cell<usize>,
}

pub struct TextLineDocument<'a> {
    pages: Vec<&'a [u8]>,
    closes: &'a Cell<usize>,
}

impl PageSource for TextLineDocument<'_> {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn render_page(&self, index: usize) -> Result<RgbaImage> {
        let line = self.pages[index];
        let mut image = RgbaImage::from_pixel(line.len().max(1) as u32, 1, Rgba([255, 255, 255, 255]));
        for (x, byte) in line.iter().enumerate() {
            image.put_pixel(x as u32, 0, Rgba([*byte, *byte, *byte, 255]));
        }
        Ok(image)
    }

    fn close(&mut self) -> Result<()> {
        self.closes.set(self.closes.get() + 1);
        Ok(())
    }
}

impl DocumentBackend for TextLineBackend {
    type Document<'a> = TextLineDocument<'a>;

    fn load<'a>(&'a self, bytes: &'a [u8]) -> Result<TextLineDocument<'a>> {
        self.loads.set(self.loads.get() + 1);
        if !bytes.starts_with(b"%PDF-") {
            return Err(CompareError::InvalidDocument("missing %PDF- header".to_string()));
        }
        let pages = bytes
            .split(|&b| b == b'\n' || b == b'\r')
            .filter(|line| line.starts_with(b"BT "))
            .collect();
        Ok(TextLineDocument {
            pages,
            closes: &self.closes,
        })
    }
}
