//! バッチのエクスポート（CSV / Excel）
//!
//! 1ビジネス=1行、1フィールド=1列のフラットなレイアウトで2つの
//! 成果物を書き出す。列名はフィールド名から導出し、ネストした構造は
//! '_' で結合する（Businessはフラットだが契約としては一般形を保つ）。

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::error::ScraperError;
use crate::maps::BusinessBatch;

/// 1検索語分のエクスポート成果物
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub csv_path: PathBuf,
    pub xlsx_path: PathBuf,
}

/// バッチをCSVとExcelの両形式で出力ディレクトリへ書き出す
pub fn write_batch(batch: &BusinessBatch, out_dir: &Path) -> Result<ExportPaths, ScraperError> {
    std::fs::create_dir_all(out_dir)?;

    let stem = batch.filename_stem();
    let (columns, rows) = flatten_batch(batch)?;

    let csv_path = out_dir.join(format!("{}.csv", stem));
    write_csv(&csv_path, &columns, &rows)?;

    let xlsx_path = out_dir.join(format!("{}.xlsx", stem));
    write_xlsx(&xlsx_path, &columns, &rows)?;

    info!(
        "Exported {} records for '{}' to {:?} and {:?}",
        batch.len(),
        batch.search_term,
        csv_path,
        xlsx_path
    );

    Ok(ExportPaths {
        csv_path,
        xlsx_path,
    })
}

/// バッチをフラットな列名リストと行データに変換する
///
/// 列順は先頭レコードのフラット化キー順。Businessは全フィールドを
/// シリアライズするので全行で同じスキーマになる
fn flatten_batch(batch: &BusinessBatch) -> Result<(Vec<String>, Vec<Vec<Value>>), ScraperError> {
    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(batch.len());

    for business in &batch.businesses {
        let value = serde_json::to_value(business)
            .map_err(|e| ScraperError::Export(format!("シリアライズ失敗: {}", e)))?;

        let mut flat = Vec::new();
        flatten_value(None, &value, &mut flat);

        if columns.is_empty() {
            columns = flat.iter().map(|(k, _)| k.clone()).collect();
        }

        let row = columns
            .iter()
            .map(|col| {
                flat.iter()
                    .find(|(k, _)| k == col)
                    .map(|(_, v)| v.clone())
                    .unwrap_or(Value::Null)
            })
            .collect();
        rows.push(row);
    }

    Ok((columns, rows))
}

/// JSON値を '_' 結合キーでフラット化する（挿入順保持）
fn flatten_value(prefix: Option<&str>, value: &Value, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                let joined = match prefix {
                    Some(p) => format!("{}_{}", p, key),
                    None => key.clone(),
                };
                flatten_value(Some(&joined), inner, out);
            }
        }
        other => {
            out.push((prefix.unwrap_or_default().to_string(), other.clone()));
        }
    }
}

/// セル表示用のテキスト（欠損は空セル）
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_csv(path: &Path, columns: &[String], rows: &[Vec<Value>]) -> Result<(), ScraperError> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|e| ScraperError::Export(e.to_string()))?;

    if !columns.is_empty() {
        writer
            .write_record(columns)
            .map_err(|e| ScraperError::Export(e.to_string()))?;
    }

    for row in rows {
        let record: Vec<String> = row.iter().map(cell_text).collect();
        writer
            .write_record(&record)
            .map_err(|e| ScraperError::Export(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| ScraperError::Export(e.to_string()))?;
    Ok(())
}

fn write_xlsx(path: &Path, columns: &[String], rows: &[Vec<Value>]) -> Result<(), ScraperError> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in columns.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, name)
            .map_err(|e| ScraperError::Export(e.to_string()))?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            let col_num = col as u16;
            match value {
                Value::Null => {}
                Value::Number(n) => {
                    worksheet
                        .write_number(row_num, col_num, n.as_f64().unwrap_or(0.0))
                        .map_err(|e| ScraperError::Export(e.to_string()))?;
                }
                other => {
                    worksheet
                        .write_string(row_num, col_num, cell_text(other))
                        .map_err(|e| ScraperError::Export(e.to_string()))?;
                }
            }
        }
    }

    workbook
        .save(path)
        .map_err(|e| ScraperError::Export(e.to_string()))?;
    Ok(())
}
