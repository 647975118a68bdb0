use serde::Deserialize;

use crate::{ConnectionRecord, StationRecord, TransferRecord};

// Every column is optional at the serde level so that a missing field ends up
// as a row issue instead of aborting the whole table.

#[derive(Debug, Deserialize)]
pub(crate) struct RawStation {
    #[serde(default)]
    station_name: Option<String>,
    #[serde(default)]
    lat: Option<String>,
    #[serde(default)]
    lng: Option<String>,
    #[serde(default)]
    lines: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawConnection {
    #[serde(default, rename = "Station")]
    station: Option<String>,
    #[serde(default, rename = "Destination")]
    destination: Option<String>,
    #[serde(default, rename = "Line")]
    line: Option<String>,
    #[serde(default, rename = "To Line")]
    to_line: Option<String>,
    #[serde(default, rename = "Minutes")]
    minutes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTransfer {
    #[serde(default, rename = "Station Name")]
    station: Option<String>,
    #[serde(default, rename = "Start Line")]
    start_line: Option<String>,
    #[serde(default, rename = "Start Code")]
    start_code: Option<String>,
    #[serde(default, rename = "End Line")]
    end_line: Option<String>,
    #[serde(default, rename = "End Code")]
    end_code: Option<String>,
    #[serde(default, rename = "Transfer time in seconds")]
    seconds: Option<String>,
    #[serde(default, rename = "Direction")]
    direction: Option<String>,
    #[serde(default, rename = "Peak")]
    peak: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, column: &str) -> Result<String, String> {
    non_empty(value).ok_or_else(|| format!("missing {}", column))
}

fn number<T: std::str::FromStr>(value: Option<String>, column: &str) -> Result<Option<T>, String> {
    match non_empty(value) {
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("invalid {} '{}'", column, v)),
        None => Ok(None),
    }
}

fn flag(value: Option<String>) -> Result<Option<bool>, String> {
    match non_empty(value).map(|v| v.to_lowercase()) {
        None => Ok(None),
        Some(v) => match v.as_str() {
            "yes" | "y" | "true" | "1" => Ok(Some(true)),
            "no" | "n" | "false" | "0" => Ok(Some(false)),
            _ => Err(format!("invalid Peak '{}'", v)),
        },
    }
}

impl RawStation {
    pub(crate) fn into_record(self) -> Result<StationRecord, String> {
        let name = required(self.station_name, "station_name")?;
        let lat = number::<f64>(self.lat, "lat")?;
        let lon = number::<f64>(self.lng, "lng")?;
        if lat.is_some() != lon.is_some() {
            return Err(format!("incomplete coordinates for {}", name));
        }
        let lines = non_empty(self.lines)
            .map(|lines| {
                lines
                    .split([';', '/'])
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(StationRecord {
            name,
            lines,
            lat,
            lon,
        })
    }
}

impl RawConnection {
    pub(crate) fn into_record(self) -> Result<ConnectionRecord, String> {
        Ok(ConnectionRecord {
            from: required(self.station, "Station")?,
            to: required(self.destination, "Destination")?,
            line: required(self.line, "Line")?,
            to_line: non_empty(self.to_line),
            minutes: number::<f64>(self.minutes, "Minutes")?,
        })
    }
}

impl RawTransfer {
    pub(crate) fn into_record(self) -> Result<TransferRecord, String> {
        let station = required(self.station, "Station Name")?;
        let from_line = required(self.start_line, "Start Line")?;
        let code_from = required(self.start_code, "Start Code")?;
        let to_line = required(self.end_line, "End Line")?;
        let code_to = required(self.end_code, "End Code")?;
        let seconds = number::<u32>(self.seconds, "Transfer time in seconds")?
            .ok_or_else(|| "missing Transfer time in seconds".to_string())?;

        Ok(TransferRecord {
            station,
            from_line,
            code_from,
            to_line,
            code_to,
            seconds,
            direction: non_empty(self.direction),
            peak_hour: flag(self.peak)?,
        })
    }
}
