//! Serial-number resolution against the reference table.

pub mod table;

pub use table::ReferenceTable;

use crate::model::{LocatedCircuit, SerialValue};

/// Resolve every record's serial number. Purely functional over the
/// (records, table) pair: running it again yields the same values.
pub fn resolve_serials(records: &mut [LocatedCircuit], table: &ReferenceTable) {
    for record in records.iter_mut() {
        record.serial = Some(resolve_one(record, table));
    }
}

fn resolve_one(record: &LocatedCircuit, table: &ReferenceTable) -> SerialValue {
    let circuit: i64 = match record.circuit_number.parse() {
        Ok(n) => n,
        Err(_) => return SerialValue::FormatError,
    };

    // Identical circuit numbers recur across connector contexts; the
    // part-number flag columns say which row belongs to this page.
    let flag_columns: Vec<usize> = record
        .part_numbers
        .iter()
        .filter_map(|token| table.column_index(token))
        .collect();

    if !flag_columns.is_empty() {
        if let Some(row) = table.find_row(circuit, Some(&flag_columns)) {
            return table.serial_at(row);
        }
    }

    // Fallback: plain circuit-number match over the whole table. First row
    // in table order wins.
    match table.find_row(circuit, None) {
        Some(row) => table.serial_at(row),
        None => SerialValue::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;
    use calamine::Data;

    fn record(circuit: &str, part_numbers: &[&str]) -> LocatedCircuit {
        LocatedCircuit {
            page_index: 0,
            circuit_number: circuit.to_string(),
            match_text: format!("{circuit}/W0001,"),
            bounds: Rect::new(100.0, 200.0, 140.0, 210.0),
            page_rotation: 0,
            is_left_half: true,
            page_width: 595.0,
            page_height: 842.0,
            part_numbers: part_numbers.iter().map(|p| p.to_string()).collect(),
            serial: None,
        }
    }

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn table() -> ReferenceTable {
        ReferenceTable::from_rows(
            vec![
                "Wire Internal Name".into(),
                "SN FILS SIMPLE".into(),
                "SN GROUP".into(),
                "12A".into(),
                "9B".into(),
            ],
            vec![
                vec![Data::Int(7), s("AA01"), s("G1"), Data::Empty, s("1")],
                vec![Data::Int(7), s("AB12"), s("G2"), s("1"), Data::Empty],
                vec![Data::Int(8), s("CC03"), Data::Empty, Data::Empty, Data::Empty],
            ],
            "Wire Internal Name",
            "SN FILS SIMPLE",
        )
        .unwrap()
    }

    fn serial_of(record: &LocatedCircuit) -> String {
        record.serial.as_ref().map(|s| s.to_string()).unwrap_or_default()
    }

    #[test]
    fn flag_column_prefers_the_flagged_row() {
        // Circuit 7 appears twice; the 12A flag picks the second row over
        // the earlier unflagged one.
        let mut records = vec![record("7", &["12A"])];
        resolve_serials(&mut records, &table());
        assert_eq!(serial_of(&records[0]), "AB12");
    }

    #[test]
    fn falls_back_to_plain_match_when_flags_never_hit() {
        // 12A is a known column but no circuit-8 row carries the flag.
        let mut records = vec![record("8", &["12A"])];
        resolve_serials(&mut records, &table());
        assert_eq!(serial_of(&records[0]), "CC03");
    }

    #[test]
    fn no_part_numbers_means_first_row_in_table_order() {
        let mut records = vec![record("7", &[])];
        resolve_serials(&mut records, &table());
        assert_eq!(serial_of(&records[0]), "AA01");
        assert_eq!(
            records[0].serial,
            Some(SerialValue::Resolved {
                serial: "AA01".into(),
                group: Some("G1".into()),
            })
        );
    }

    #[test]
    fn unknown_tokens_are_ignored_as_flag_columns() {
        // "77C" names no column, so resolution degrades to the plain match.
        let mut records = vec![record("7", &["77C"])];
        resolve_serials(&mut records, &table());
        assert_eq!(serial_of(&records[0]), "AA01");
    }

    #[test]
    fn absent_circuit_resolves_to_not_found() {
        let mut records = vec![record("99", &[])];
        resolve_serials(&mut records, &table());
        assert_eq!(records[0].serial, Some(SerialValue::NotFound));
    }

    #[test]
    fn non_numeric_circuit_resolves_to_format_error() {
        let mut records = vec![record("12X", &[])];
        resolve_serials(&mut records, &table());
        assert_eq!(records[0].serial, Some(SerialValue::FormatError));
    }

    #[test]
    fn resolution_is_idempotent() {
        let t = table();
        let mut once = vec![record("7", &["12A"]), record("99", &[]), record("12X", &[])];
        resolve_serials(&mut once, &t);
        let mut twice = once.clone();
        resolve_serials(&mut twice, &t);
        for (a, b) in once.iter().zip(&twice) {
            assert_eq!(a.serial, b.serial);
        }
    }
}
