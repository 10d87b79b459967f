use crate::frame::WidgetFrame;
use prayer_core::{Result, WidgetError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where rendered frames go.
pub trait Surface: Send + Sync {
    fn draw(&self, frame: &WidgetFrame) -> Result<()>;
}

/// Publishes each family's latest frame as `<layout_key>.json` in a
/// directory watched by the home-screen host.
#[derive(Debug, Clone)]
pub struct JsonSurface {
    dir: PathBuf,
}

impl JsonSurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, frame: &WidgetFrame) -> PathBuf {
        self.dir.join(format!("{}.json", frame.layout_key))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Surface for JsonSurface {
    fn draw(&self, frame: &WidgetFrame) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec_pretty(frame)
            .map_err(|e| WidgetError::Store(format!("cannot encode frame: {e}")))?;

        let target = self.path_for(frame);
        let tmp = target.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&json)?;
        }
        std::fs::rename(&tmp, &target)?;
        debug!(path = %target.display(), "frame published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use prayer_core::{CacheRecord, NextEvent, Prayer, WidgetFamily};
    use prayer_theme::WidgetTheme;

    #[test]
    fn writes_one_file_per_layout() {
        let dir = tempfile::tempdir().unwrap();
        let surface = JsonSurface::new(dir.path().join("frames"));
        let record = CacheRecord::default();
        let theme = WidgetTheme::from_record(&record, None, false);
        let next = NextEvent { prayer: Prayer::Fajr, time: "05:45".into() };

        for family in WidgetFamily::ALL {
            let frame = WidgetFrame::build(family, &record, &theme, &next, false, Local::now());
            surface.draw(&frame).unwrap();
            surface.draw(&frame).unwrap();

            let raw = std::fs::read_to_string(surface.path_for(&frame)).unwrap();
            let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
            assert_eq!(json["layoutKey"], family.layout_key());
            assert_eq!(json["rows"].as_array().map(Vec::len), Some(6));
            assert!(json["palette"]["background"].as_str().unwrap().starts_with('#'));
        }
        assert_eq!(std::fs::read_dir(surface.dir()).unwrap().count(), 2);
    }
}
