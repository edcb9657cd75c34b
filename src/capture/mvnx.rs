// MVNX reader
// Parses Xsens MVNX (XML) captures into per-frame segment and contact channels

use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;

use super::{AccelerationFrame, CaptureError, CaptureSource, ContactFrame};

/// A parsed MVNX capture
///
/// Only `type="normal"` frames are kept; identity, T-pose and calibration
/// frames recorded at the start of a session carry no motion data.
#[derive(Debug, Clone)]
pub struct MvnxReader {
    /// Segment names in data order, snake_case
    segments: Vec<String>,

    /// Foot-contact labels in data order, if the capture defines them
    contact_labels: Option<Vec<String>>,

    frames: Vec<RawFrame>,
}

#[derive(Debug, Clone)]
struct RawFrame {
    index: usize,
    acceleration: Option<String>,
    foot_contacts: Option<String>,
}

impl MvnxReader {
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let xml = fs::read_to_string(path)?;
        let reader = Self::parse(&xml)?;

        log::debug!(
            "Read {} frames, {} segments from {}",
            reader.frames.len(),
            reader.segments.len(),
            path.display()
        );

        Ok(reader)
    }

    pub fn parse(xml: &str) -> Result<Self, CaptureError> {
        let doc = Document::parse(xml)?;
        let subject = required_child(doc.root_element(), "subject")?;

        let segments = ordered_labels(required_child(subject, "segments")?, "segment", "id")?
            .into_iter()
            .map(|label| snake_case(&label))
            .collect();

        let contact_labels = match child(subject, "footContactDefinition") {
            Some(definition) => Some(ordered_labels(definition, "contactDefinition", "index")?),
            None => None,
        };

        let frames = required_child(subject, "frames")?
            .children()
            .filter(|n| n.tag_name().name() == "frame")
            .filter(|n| n.attribute("type").unwrap_or("normal") == "normal")
            .enumerate()
            .map(|(position, frame)| RawFrame {
                index: frame
                    .attribute("index")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(position),
                acceleration: child_text(frame, "acceleration"),
                foot_contacts: child_text(frame, "footContacts"),
            })
            .collect();

        Ok(MvnxReader {
            segments,
            contact_labels,
            frames,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl CaptureSource for MvnxReader {
    fn acceleration(&self) -> Result<Vec<AccelerationFrame>, CaptureError> {
        let expected = self.segments.len() * 3;

        self.frames
            .iter()
            .map(|frame| {
                let text = frame
                    .acceleration
                    .as_deref()
                    .ok_or(CaptureError::MissingElement("acceleration"))?;
                let values = parse_values(text, frame.index, "acceleration")?;
                if values.len() != expected {
                    return Err(CaptureError::ValueCount {
                        frame: frame.index,
                        element: "acceleration",
                        found: values.len(),
                        expected,
                    });
                }

                Ok(self
                    .segments
                    .iter()
                    .zip(values.chunks_exact(3))
                    .map(|(name, v)| (name.clone(), [v[0], v[1], v[2]]))
                    .collect())
            })
            .collect()
    }

    fn foot_contacts(&self) -> Result<Vec<ContactFrame>, CaptureError> {
        let labels = self
            .contact_labels
            .as_ref()
            .ok_or(CaptureError::MissingElement("footContactDefinition"))?;

        self.frames
            .iter()
            .map(|frame| {
                let text = frame
                    .foot_contacts
                    .as_deref()
                    .ok_or(CaptureError::MissingElement("footContacts"))?;
                let values = parse_values(text, frame.index, "footContacts")?;
                if values.len() != labels.len() {
                    return Err(CaptureError::ValueCount {
                        frame: frame.index,
                        element: "footContacts",
                        found: values.len(),
                        expected: labels.len(),
                    });
                }

                Ok(labels.iter().cloned().zip(values).collect())
            })
            .collect()
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.tag_name().name() == name)
}

fn required_child<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> Result<Node<'a, 'input>, CaptureError> {
    child(node, name).ok_or(CaptureError::MissingElement(name))
}

fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name).map(|n| n.text().unwrap_or("").to_string())
}

/// Labels of `element` children, sorted by the numeric `order_attr`
fn ordered_labels(
    parent: Node,
    element: &'static str,
    order_attr: &str,
) -> Result<Vec<String>, CaptureError> {
    let mut labelled = parent
        .children()
        .filter(|n| n.tag_name().name() == element)
        .enumerate()
        .map(|(position, node)| {
            let order = node
                .attribute(order_attr)
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(position);
            node.attribute("label")
                .map(|label| (order, label.to_string()))
                .ok_or(CaptureError::MissingElement(element))
        })
        .collect::<Result<Vec<_>, _>>()?;

    labelled.sort_by_key(|(order, _)| *order);
    Ok(labelled.into_iter().map(|(_, label)| label).collect())
}

fn parse_values(text: &str, frame: usize, element: &'static str) -> Result<Vec<f32>, CaptureError> {
    text.split_whitespace()
        .map(|token| {
            token.parse::<f32>().map_err(|_| CaptureError::InvalidNumber {
                frame,
                element,
                value: token.to_string(),
            })
        })
        .collect()
}

/// "LeftHand" -> "left_hand", "T8" -> "t8"
fn snake_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len() + 4);
    let mut prev_lower = false;

    for ch in label.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }

    out
}
