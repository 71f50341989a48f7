//! FFI interface for C/C++ hosts
//!
//! Tables and charts cross the boundary as JSON and SVG text.
//! Every result must be released with `free_tables_result`.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::chart::{ChartSpecAssembler, RenderOptions, SvgRenderer};
use crate::error::ChartError;
use crate::series::build_series;
use crate::tables::{extract_tables, SelectionConfig, TabularDataset};

/// Result struct returned to the host
/// Both pointers are owned by Rust and must be freed via free_tables_result
#[repr(C)]
pub struct TablesResultFFI {
    /// Payload (null-terminated), or null on failure
    pub data_ptr: *mut c_char,
    /// Error message (null-terminated), or null on success
    pub error_ptr: *mut c_char,
    /// Nonzero when the table had no numeric columns to chart
    pub no_numeric_data: u8,
}

/// Extract tables from HTML.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `config_json` - JSON selection config such as `{"containClasses": ["wikitable"]}`,
///   or null to select every table
///
/// # Returns
/// JSON array with one array of row objects per matched table
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `config_json` must be null or a valid null-terminated C string
/// - Caller must free the result via `free_tables_result`
#[no_mangle]
pub unsafe extern "C" fn extract_tables_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    config_json: *const c_char,
) -> TablesResultFFI {
    let html = match read_bytes(html_ptr, html_len) {
        Ok(html) => html,
        Err(msg) => return make_error_result(msg),
    };

    let config: SelectionConfig = if config_json.is_null() {
        SelectionConfig::default()
    } else {
        let config_str = match CStr::from_ptr(config_json).to_str() {
            Ok(s) => s,
            Err(_) => return make_error_result("Invalid UTF-8 in config JSON"),
        };
        match serde_json::from_str(config_str) {
            Ok(c) => c,
            Err(e) => return make_error_result(&format!("Failed to parse config JSON: {}", e)),
        }
    };

    let tables = extract_tables(html, &config);
    match serde_json::to_string(&tables) {
        Ok(json) => make_data_result(json),
        Err(e) => make_error_result(&format!("Failed to serialize tables: {}", e)),
    }
}

/// Render one extracted table (JSON array of row objects) as an SVG bar chart.
///
/// Fails with `no_numeric_data` set when the table has no numeric column.
///
/// # Safety
/// - `table_ptr` must point to valid memory of at least `table_len` bytes
/// - Caller must free the result via `free_tables_result`
#[no_mangle]
pub unsafe extern "C" fn chart_table_svg_ffi(
    table_ptr: *const c_char,
    table_len: usize,
) -> TablesResultFFI {
    let table_json = match read_bytes(table_ptr, table_len) {
        Ok(json) => json,
        Err(msg) => return make_error_result(msg),
    };

    let table: TabularDataset = match serde_json::from_str(table_json) {
        Ok(t) => t,
        Err(e) => return make_error_result(&format!("Failed to parse table JSON: {}", e)),
    };

    let series = build_series(&table);
    let assembler = ChartSpecAssembler::new();
    let options = RenderOptions::default();
    let render = assembler.chart(series.as_ref(), &SvgRenderer, &options);

    match futures::executor::block_on(render) {
        Ok(svg) => match String::from_utf8(svg) {
            Ok(svg) => make_data_result(svg),
            Err(_) => make_error_result("Renderer produced invalid UTF-8"),
        },
        Err(e @ ChartError::NoNumericData) => TablesResultFFI {
            no_numeric_data: 1,
            ..make_error_result(&e.to_string())
        },
        Err(e) => make_error_result(&e.to_string()),
    }
}

/// Free a TablesResultFFI returned by this library
///
/// # Safety
/// - `result` must have been returned by a function in this module
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_tables_result(result: TablesResultFFI) {
    if !result.data_ptr.is_null() {
        drop(CString::from_raw(result.data_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

// Borrow host bytes as UTF-8; null or empty input reads as ""
unsafe fn read_bytes<'a>(ptr: *const c_char, len: usize) -> Result<&'a str, &'static str> {
    if ptr.is_null() || len == 0 {
        return Ok("");
    }
    let slice = std::slice::from_raw_parts(ptr as *const u8, len);
    std::str::from_utf8(slice).map_err(|_| "Invalid UTF-8 in input")
}

fn make_data_result(data: String) -> TablesResultFFI {
    match CString::new(data) {
        Ok(cstr) => TablesResultFFI {
            data_ptr: cstr.into_raw(),
            error_ptr: ptr::null_mut(),
            no_numeric_data: 0,
        },
        Err(_) => make_error_result("Result contains null bytes"),
    }
}

fn make_error_result(msg: &str) -> TablesResultFFI {
    let error_ptr = CString::new(msg)
        .or_else(|_| CString::new("Unknown error"))
        .map_or(ptr::null_mut(), CString::into_raw);
    TablesResultFFI {
        data_ptr: ptr::null_mut(),
        error_ptr,
        no_numeric_data: 0,
    }
}
