use crate::render::{ConnectorScene, FrameReport};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct AnimationDump {
    pub exit: String,
    pub from: [f32; 2],
    pub control: [f32; 2],
    pub to: [f32; 2],
    pub frames: Vec<FrameDump>,
}

#[derive(Debug, Serialize)]
pub struct FrameDump {
    pub index: usize,
    pub elapsed_ms: f32,
    pub drawn: bool,
    pub strands: Vec<StrandDump>,
}

#[derive(Debug, Serialize)]
pub struct StrandDump {
    pub width: f32,
    pub points: Vec<[f32; 2]>,
}

impl AnimationDump {
    pub fn new(scene: &ConnectorScene) -> Self {
        let curve = &scene.curve;
        AnimationDump {
            exit: format!("{:?}", scene.anchors.exit),
            from: [curve.p0.0, curve.p0.1],
            control: [curve.p1.0, curve.p1.1],
            to: [curve.p2.0, curve.p2.1],
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self, report: &FrameReport) {
        let strands = report
            .strands
            .iter()
            .map(|path| StrandDump {
                width: path.width,
                points: path.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();
        self.frames.push(FrameDump {
            index: self.frames.len(),
            elapsed_ms: report.elapsed_ms,
            drawn: report.drawn,
            strands,
        });
    }
}

pub fn write_animation_dump(path: &Path, dump: &AnimationDump) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectorConfig;
    use crate::geometry::Rect;
    use crate::render::StrandPath;

    #[test]
    fn dump_serializes_frames() {
        let scene = ConnectorScene::new(
            &Rect::new(0.0, 100.0, 50.0, 20.0),
            &Rect::new(200.0, 0.0, 50.0, 20.0),
            300.0,
            200.0,
            &ConnectorConfig::default(),
        );
        let mut dump = AnimationDump::new(&scene);
        dump.push(&FrameReport {
            elapsed_ms: 16.0,
            drawn: true,
            strands: vec![StrandPath {
                points: vec![(1.0, 2.0), (3.0, 4.0)],
                width: 0.5,
            }],
        });
        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["exit"], "Right");
        assert_eq!(json["control"][0], 150.0);
        assert_eq!(json["frames"][0]["index"], 0);
        assert_eq!(json["frames"][0]["strands"][0]["points"][1][0], 3.0);
    }
}
