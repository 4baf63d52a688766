//! ナビゲーションURLからの座標抽出
//!
//! 場所が開いている間、Google MapsのURLには `/@lat,lon,zoom` セグメントが
//! 含まれる。それを構造的に分割してパースするだけで、バリデーションは
//! それ以上行わない。

use crate::error::ScraperError;

/// `.../@12.34,-56.78,15z/...` 形式のURLから (latitude, longitude) を抽出する
///
/// 失敗はリスティング単位のエラーとして扱うこと。既に収集済みの
/// フィールドごとリスティング全体を破棄し、ランは継続する。
pub fn extract_coordinates(url: &str) -> Result<(f64, f64), ScraperError> {
    let segment = url
        .rsplit("/@")
        .next()
        .filter(|_| url.contains("/@"))
        .ok_or_else(|| ScraperError::CoordinateFormat(format!("no /@ segment in '{}'", url)))?;

    let coords = segment.split('/').next().unwrap_or(segment);
    let mut parts = coords.split(',');

    let lat = parts
        .next()
        .ok_or_else(|| ScraperError::CoordinateFormat(format!("missing latitude in '{}'", coords)))?;
    let lon = parts.next().ok_or_else(|| {
        ScraperError::CoordinateFormat(format!("missing longitude in '{}'", coords))
    })?;

    let lat: f64 = lat.trim().parse().map_err(|_| {
        ScraperError::CoordinateFormat(format!("non-numeric latitude '{}'", lat))
    })?;
    let lon: f64 = lon.trim().parse().map_err(|_| {
        ScraperError::CoordinateFormat(format!("non-numeric longitude '{}'", lon))
    })?;

    Ok((lat, lon))
}
