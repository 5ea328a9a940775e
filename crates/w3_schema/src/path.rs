//! Paths to fields inside a document, as reported by errors
//!

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Name(String),
    Index(usize),
}

/// Location of the field being decoded or encoded, e.g. `doodads[3].pos_x`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    pub fn push_name(&mut self, name: &str) {
        self.0.push(Segment::Name(name.to_owned()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.0.push(Segment::Index(index));
    }

    pub fn pop(&mut self) {
        self.0.pop();
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Trim back to a depth recorded earlier
    pub fn truncate(&mut self, depth: usize) {
        self.0.truncate(depth);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Name(name) if i == 0 => f.write_str(name)?,
                Segment::Name(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::FieldPath;

    #[test]
    fn display() {
        let mut path = FieldPath::default();
        assert_eq!(path.to_string(), "<root>");

        path.push_name("doodads");
        path.push_index(3);
        path.push_name("pos_x");
        assert_eq!(path.to_string(), "doodads[3].pos_x");

        path.pop();
        path.pop();
        assert_eq!(path.to_string(), "doodads");
    }
}
