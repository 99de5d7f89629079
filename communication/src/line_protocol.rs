use std::fmt::Write;

use crate::point::{FieldValue, Point, Precision, Tags};

/// Encodes a whole batch, one line per point, in batch order.
pub fn encode_batch(points: &[Point], precision: Precision, default_tags: &Tags) -> String {
    let mut body = String::with_capacity(points.len() * 64);
    for point in points {
        encode_point(point, precision, default_tags, &mut body);
    }
    body
}

/// `measurement[,tag=value...] field=value[,field=value...] timestamp\n`
///
/// Tags are written sorted by key. A point's own tag wins over a default tag
/// with the same key.
pub fn encode_point(point: &Point, precision: Precision, default_tags: &Tags, out: &mut String) {
    escape_into(point.measurement(), &[',', ' '], out);

    let mut tags = default_tags
        .iter()
        .filter(|(key, _)| !point.tags().contains_key(*key))
        .chain(point.tags().iter())
        .collect::<Vec<_>>();
    tags.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in tags {
        out.push(',');
        escape_into(key, &[',', '=', ' '], out);
        out.push('=');
        escape_into(value, &[',', '=', ' '], out);
    }

    out.push(' ');
    for (i, (key, value)) in point.fields().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        escape_into(key, &[',', '=', ' '], out);
        out.push('=');
        encode_field_value(value, out);
    }

    // Writing into a String cannot fail.
    let _ = writeln!(out, " {}", precision.convert(point.unix_nanos()));
}

fn encode_field_value(value: &FieldValue, out: &mut String) {
    match value {
        FieldValue::Float(f) => {
            let _ = write!(out, "{f}");
        }
        FieldValue::Integer(i) => {
            let _ = write!(out, "{i}i");
        }
        FieldValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        FieldValue::String(s) => {
            out.push('"');
            escape_into(s, &['"', '\\'], out);
            out.push('"');
        }
    }
}

fn escape_into(s: &str, special: &[char], out: &mut String) {
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
