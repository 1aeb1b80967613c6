use dump_extract::extract::{parse_dump, parse_reader};
use dump_extract::parser::{
    escape, split_tuple_fields, split_tuples, unescape, DumpScanner, Value,
};
use std::fs;
use tempfile::TempDir;

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

mod tests {
    use super::*;

    #[test]
    fn test_single_row() {
        let sql = "INSERT INTO `t` (`a`, `b`) VALUES\n(1,'x');\n";
        let extract = parse_reader(sql.as_bytes(), ["t"]).unwrap();
        assert_eq!(extract.rows("t"), &[vec![Value::Integer(1), text("x")]]);
        assert_eq!(extract.stats.scan.statements, 1);
    }

    #[test]
    fn test_escape_round_trip() {
        let samples = [
            "\\", "'", "\"", "\r", "\n", "\t", "a\\b'c\"d\re\nf\tg", "\\n", "",
        ];
        for s in samples {
            assert_eq!(unescape(&escape(s)), s, "round trip of {s:?}");
        }
    }

    #[test]
    fn test_escaped_quote_is_one_field() {
        let fields = split_tuple_fields(r"(5,'O\'Brien',NULL)");
        assert_eq!(fields.len(), 3);
        assert_eq!(dump_extract::parser::coerce(fields[1]), text("O'Brien"));
    }

    #[test]
    fn test_comma_inside_string() {
        let sql = "INSERT INTO `t` (`a`, `b`, `c`) VALUES\n(1,'a,b',2);\n";
        let extract = parse_reader(sql.as_bytes(), ["t"]).unwrap();
        assert_eq!(
            extract.rows("t"),
            &[vec![Value::Integer(1), text("a,b"), Value::Integer(2)]]
        );
    }

    #[test]
    fn test_two_tuples_in_order() {
        let sql = "INSERT INTO `t` (`a`, `b`) VALUES\n(1,'a'),(2,'b');\n";
        let extract = parse_reader(sql.as_bytes(), ["t"]).unwrap();
        let rows = extract.rows("t");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![Value::Integer(1), text("a")]);
        assert_eq!(rows[1], vec![Value::Integer(2), text("b")]);
    }

    #[test]
    fn test_non_target_tables_skipped() {
        let sql = "\
INSERT INTO `sessions` (`id`, `payload`) VALUES
(1,'secret'),
(2,'other');
INSERT INTO `users` (`id`) VALUES
(9);
";
        let extract = parse_reader(sql.as_bytes(), ["users", "logs"]).unwrap();
        assert_eq!(extract.rows("users").len(), 1);
        assert!(extract.rows("sessions").is_empty());
        assert!(extract.rows("logs").is_empty());
        assert_eq!(extract.stats.scan.skipped_statements, 1);
    }

    #[test]
    fn test_unterminated_tuple_at_eof() {
        let sql = "INSERT INTO `t` (`a`) VALUES\n(1),\n(2";
        let extract = parse_reader(sql.as_bytes(), ["t"]).unwrap();
        assert!(extract.rows("t").is_empty());
        assert_eq!(extract.stats.scan.malformed_statements, 1);
    }

    #[test]
    fn test_broken_statement_does_not_hide_later_ones() {
        let sql = "\
INSERT INTO `users` (`id`, `name`) VALUES
(1,'ok'),(2,'broken);
INSERT INTO `tour_packages` (`id`) VALUES
(10),(11);
INSERT INTO `users` (`id`, `name`) VALUES
(3,'after');
";
        let extract = parse_reader(sql.as_bytes(), ["users", "tour_packages"]).unwrap();
        assert_eq!(extract.rows("tour_packages").len(), 2);
        assert_eq!(extract.rows("users"), &[vec![Value::Integer(3), text("after")]]);
        assert_eq!(extract.stats.scan.malformed_statements, 1);
    }

    #[test]
    fn test_open_tuple_dropped_but_earlier_rows_kept() {
        let split = split_tuples("(1,'a'),(2,'b'");
        assert_eq!(split.tuples, vec!["(1,'a')"]);
        assert!(split.dropped);
    }

    #[test]
    fn test_semicolon_line_inside_string_does_not_terminate() {
        let sql = "\
INSERT INTO `t` (`id`, `body`) VALUES
(1,'first line;
second line'),
(2,'done');
";
        let extract = parse_reader(sql.as_bytes(), ["t"]).unwrap();
        let rows = extract.rows("t");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], text("first line;\nsecond line"));
        assert_eq!(rows[1][1], text("done"));
    }

    #[test]
    fn test_crlf_dump() {
        let sql = "INSERT INTO `t` (`a`, `b`) VALUES\r\n(1,'x'),\r\n(2,NULL);\r\n";
        let extract = parse_reader(sql.as_bytes(), ["t"]).unwrap();
        assert_eq!(extract.rows("t")[1], vec![Value::Integer(2), Value::Null]);
    }

    #[test]
    fn test_decimal_and_fallback_counting() {
        let sql = "INSERT INTO `t` (`a`, `b`, `c`) VALUES\n(12.50,99999999999999999999,-7);\n";
        let extract = parse_reader(sql.as_bytes(), ["t"]).unwrap();
        let row = &extract.rows("t")[0];
        assert_eq!(row[0].as_decimal(), Some("12.5".parse().unwrap()));
        assert_eq!(row[1], text("99999999999999999999"));
        assert_eq!(row[2], Value::Integer(-7));
        assert_eq!(extract.stats.coercion_fallbacks(), 1);
    }

    #[test]
    fn test_scanner_iterator() {
        let sql = "INSERT INTO `a` (`x`) VALUES\n(1);\nINSERT INTO `b` (`x`) VALUES\n(2);\n";
        let tables: Vec<String> = DumpScanner::new(sql.as_bytes(), ["a", "b"])
            .map(|s| s.unwrap().table)
            .collect();
        assert_eq!(tables, vec!["a", "b"]);
    }

    #[test]
    fn test_parsing_file_twice_is_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dump.sql");
        fs::write(
            &path,
            "INSERT INTO `t` (`a`, `b`) VALUES\n(1,'x'),\n(2,'y\\'z');\n",
        )
        .unwrap();

        let first = parse_dump(&path, ["t"]).unwrap();
        let second = parse_dump(&path, ["t"]).unwrap();
        assert_eq!(first.rows("t"), second.rows("t"));
        assert_eq!(first.stats, second.stats);
        assert_eq!(first.rows("t")[1][1], text("y'z"));
    }

    #[test]
    fn test_gzip_dump() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dump.sql.gz");
        let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
        encoder
            .write_all(b"INSERT INTO `t` (`a`) VALUES\n(1),\n(2);\n")
            .unwrap();
        encoder.finish().unwrap();

        let extract = parse_dump(&path, ["t"]).unwrap();
        assert_eq!(extract.rows("t").len(), 2);
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = parse_dump(std::path::Path::new("/nonexistent/dump.sql"), ["t"]).unwrap_err();
        assert!(err.to_string().contains("cannot open dump"));
    }
}
