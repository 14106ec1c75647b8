use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::detection::domain::detection_result::FrameDetections;
use crate::reporting::domain::detection_writer::DetectionWriter;

/// Writes one JSON object per frame, newline separated.
///
/// ```text
/// {"frameIndex":0,"classes":[{"class":"red","markerColor":[255,0,0],"result":{"status":"found","x":12,"y":40,"area":900}}]}
/// ```
pub struct JsonLinesWriter<W: Write + Send> {
    sink: W,
    records: usize,
}

impl JsonLinesWriter<BufWriter<File>> {
    /// Creates (or truncates) `path`, making parent directories as needed.
    pub fn create(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        log::info!("Writing detections to {}", path.display());
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> JsonLinesWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, records: 0 }
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write + Send> DetectionWriter for JsonLinesWriter<W> {
    fn write(&mut self, detections: &FrameDetections) -> Result<(), Box<dyn std::error::Error>> {
        serde_json::to_writer(&mut self.sink, detections)?;
        self.sink.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.sink.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detection_result::{ClassDetection, DetectionResult};

    fn detections(frame_index: usize, result: DetectionResult) -> FrameDetections {
        FrameDetections {
            frame_index,
            classes: vec![ClassDetection {
                class: "red".to_string(),
                marker_color: [255, 0, 0],
                result,
            }],
        }
    }

    #[test]
    fn test_one_line_per_frame() {
        let mut writer = JsonLinesWriter::new(Vec::new());
        writer
            .write(&detections(0, DetectionResult::Found { x: 12, y: 40, area: 900 }))
            .unwrap();
        writer.write(&detections(1, DetectionResult::NotFound)).unwrap();
        writer.close().unwrap();
        assert_eq!(writer.records(), 2);

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"frameIndex":0,"classes":[{"class":"red","markerColor":[255,0,0],"result":{"status":"found","x":12,"y":40,"area":900}}]}"#
        );
        assert!(lines[1].contains(r#""status":"not_found""#));
    }

    #[test]
    fn test_lines_parse_back() {
        let mut writer = JsonLinesWriter::new(Vec::new());
        let record = detections(7, DetectionResult::TooNoisy { region_count: 64 });
        writer.write(&record).unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let parsed: FrameDetections = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_create_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/detections.jsonl");

        let mut writer = JsonLinesWriter::create(&path).unwrap();
        writer.write(&detections(0, DetectionResult::NotFound)).unwrap();
        writer.close().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
