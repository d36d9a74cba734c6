use crate::{vector::VectorTable, RecommenderError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use memmap2::Mmap;
use ndarray::Array2;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingFormat {
    Npy,
    Json,
}

impl EmbeddingFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("npy") => Ok(EmbeddingFormat::Npy),
            Some("json") => Ok(EmbeddingFormat::Json),
            _ => Err(RecommenderError::LoadError(format!(
                "Unsupported embedding file {} (expected .npy or .json)",
                path.display()
            ))),
        }
    }
}

fn load_error(path: &Path, detail: impl std::fmt::Display) -> RecommenderError {
    RecommenderError::LoadError(format!("Failed to load embeddings from {}: {}", path.display(), detail))
}

/// Reads a precomputed embedding matrix, row-aligned to corpus load order.
pub fn load_embeddings<P: AsRef<Path>>(path: P) -> Result<VectorTable> {
    let path = path.as_ref();
    match EmbeddingFormat::from_path(path)? {
        EmbeddingFormat::Npy => load_npy(path),
        EmbeddingFormat::Json => load_json(path),
    }
}

fn load_json(path: &Path) -> Result<VectorTable> {
    let contents = std::fs::read_to_string(path).map_err(|e| load_error(path, e))?;
    let rows: Vec<Vec<f32>> = serde_json::from_str(&contents).map_err(|e| load_error(path, e))?;
    VectorTable::from_rows(rows)
}

fn load_npy(path: &Path) -> Result<VectorTable> {
    let file = File::open(path).map_err(|e| load_error(path, e))?;
    if file.metadata()?.len() == 0 {
        return Err(load_error(path, "file is empty"));
    }
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| load_error(path, e))?;
    let data = decode_npy(&mmap).map_err(|detail| load_error(path, detail))?;
    VectorTable::from_array(data)
}

#[derive(Debug, PartialEq)]
struct NpyHeader {
    element_size: usize,
    rows: usize,
    cols: usize,
}

fn decode_npy(bytes: &[u8]) -> std::result::Result<Array2<f32>, String> {
    if bytes.len() < 10 || &bytes[..6] != NPY_MAGIC {
        return Err("not a NumPy .npy file".to_string());
    }

    let major = bytes[6];
    let mut cursor = &bytes[8..];
    let (header_len, prefix_len) = match major {
        1 => (cursor.read_u16::<LittleEndian>().map_err(|e| e.to_string())? as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err("truncated .npy header".to_string());
            }
            (cursor.read_u32::<LittleEndian>().map_err(|e| e.to_string())? as usize, 12)
        }
        other => return Err(format!("unsupported .npy version {}", other)),
    };

    let header_end = prefix_len + header_len;
    let header_bytes = bytes
        .get(prefix_len..header_end)
        .ok_or_else(|| "truncated .npy header".to_string())?;
    let header = std::str::from_utf8(header_bytes).map_err(|e| e.to_string())?;
    let header = parse_npy_header(header)?;

    let count = header
        .rows
        .checked_mul(header.cols)
        .ok_or_else(|| "shape overflows".to_string())?;
    let expected = count
        .checked_mul(header.element_size)
        .ok_or_else(|| "shape overflows".to_string())?;
    let available = bytes.len() - header_end;
    if expected > available {
        return Err(format!(
            "expected {} data bytes, file has {}",
            expected, available
        ));
    }
    let mut payload = &bytes[header_end..header_end + expected];

    let mut values = vec![0f32; count];
    if header.element_size == 4 {
        payload
            .read_f32_into::<LittleEndian>(&mut values)
            .map_err(|e| e.to_string())?;
    } else {
        let mut wide = vec![0f64; values.len()];
        payload
            .read_f64_into::<LittleEndian>(&mut wide)
            .map_err(|e| e.to_string())?;
        values.iter_mut().zip(wide).for_each(|(v, w)| *v = w as f32);
    }

    Array2::from_shape_vec((header.rows, header.cols), values).map_err(|e| e.to_string())
}

fn parse_npy_header(header: &str) -> std::result::Result<NpyHeader, String> {
    let descr = dict_value(header, "descr").ok_or("missing 'descr' in .npy header")?;
    let element_size = match descr.trim_matches(|c| c == '\'' || c == '"') {
        "<f4" => 4,
        "<f8" => 8,
        other => return Err(format!("unsupported dtype {} (expected <f4 or <f8)", other)),
    };

    let fortran = dict_value(header, "fortran_order").ok_or("missing 'fortran_order' in .npy header")?;
    if fortran != "False" {
        return Err("Fortran-ordered arrays are not supported".to_string());
    }

    let shape = dict_value(header, "shape").ok_or("missing 'shape' in .npy header")?;
    let dims = shape
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| dim.parse::<usize>().map_err(|e| format!("bad shape {}: {}", shape, e)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    match dims.as_slice() {
        [rows, cols] => Ok(NpyHeader {
            element_size,
            rows: *rows,
            cols: *cols,
        }),
        _ => Err(format!("expected a 2-D matrix, found shape {}", shape)),
    }
}

fn dict_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let marker = format!("'{}':", key);
    let start = header.find(&marker)? + marker.len();
    let rest = header[start..].trim_start();
    if rest.starts_with('(') {
        let end = rest.find(')')?;
        Some(&rest[..=end])
    } else {
        let end = rest.find(|c| c == ',' || c == '}')?;
        Some(rest[..end].trim())
    }
}

pub fn save_embeddings_json<P: AsRef<Path>>(table: &VectorTable, path: P) -> Result<()> {
    let rows: Vec<Vec<f32>> = table.rows().map(|row| row.to_vec()).collect();
    let json = serde_json::to_string(&rows)
        .map_err(|e| RecommenderError::Other(anyhow::anyhow!("Failed to serialize vectors: {}", e)))?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Writes a version 1.0 `.npy` file of little-endian `f32`.
pub fn save_embeddings_npy<P: AsRef<Path>>(table: &VectorTable, path: P) -> Result<()> {
    let mut header = format!(
        "{{'descr': '<f4', 'fortran_order': False, 'shape': ({}, {}), }}",
        table.len(),
        table.dimension()
    );
    // Data starts on a 64-byte boundary; the header ends with a newline.
    let unpadded = NPY_MAGIC.len() + 4 + header.len() + 1;
    header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
    header.push('\n');

    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(NPY_MAGIC)?;
    file.write_all(&[1, 0])?;
    file.write_u16::<LittleEndian>(header.len() as u16)?;
    file.write_all(header.as_bytes())?;
    for value in table.as_array().iter() {
        file.write_f32::<LittleEndian>(*value)?;
    }
    file.flush()?;
    Ok(())
}
