//! Decompression for archived legacy dumps.
//!
//! Hosting panels hand out database backups as `.sql.gz` (sometimes several
//! gzip members appended into one file, one per table chunk), `.bz2`, `.xz`
//! or `.zst`. The scanner only ever sees the decompressed byte stream.

use std::fmt;
use std::io::{self, Read};
use std::path::Path;

/// Archive format of a dump file, inferred from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("gz" | "gzip") => Compression::Gzip,
            Some("bz2" | "bzip2") => Compression::Bzip2,
            Some("xz" | "lzma") => Compression::Xz,
            Some("zst" | "zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    /// Wrap `reader` in the matching decoder. Every decoder reads through
    /// concatenated members to the end of the file.
    pub fn wrap_reader<'a>(&self, reader: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Compression::None => reader,
            Compression::Gzip => Box::new(flate2::read::MultiGzDecoder::new(reader)),
            Compression::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(reader)),
            Compression::Xz => Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)),
            Compression::Zstd => Box::new(zstd::stream::read::Decoder::new(reader)?),
        })
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Bzip2 => write!(f, "bzip2"),
            Compression::Xz => write!(f, "xz"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;

    #[test]
    fn test_from_path() {
        assert_eq!(Compression::from_path(Path::new("etike.sql")), Compression::None);
        assert_eq!(Compression::from_path(Path::new("etike.sql.gz")), Compression::Gzip);
        assert_eq!(Compression::from_path(Path::new("etike.SQL.BZ2")), Compression::Bzip2);
        assert_eq!(Compression::from_path(Path::new("etike.sql.xz")), Compression::Xz);
        assert_eq!(Compression::from_path(Path::new("etike.sql.zst")), Compression::Zstd);
    }

    #[test]
    fn test_gzip_round_trip() {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"INSERT INTO `t` (`a`) VALUES\n(1);\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut reader = Compression::Gzip
            .wrap_reader(Box::new(&compressed[..]))
            .unwrap();
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert!(out.starts_with("INSERT INTO `t`"));
    }

    #[test]
    fn test_concatenated_gzip_members_read_in_full() {
        let mut file = Vec::new();
        for chunk in [&b"INSERT INTO `t` (`a`) VALUES\n(1);\n"[..], b"INSERT INTO `t` (`a`) VALUES\n(2);\n"] {
            let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(chunk).unwrap();
            file.extend(encoder.finish().unwrap());
        }

        let reader = Compression::Gzip.wrap_reader(Box::new(&file[..])).unwrap();
        let extract = crate::extract::parse_reader(reader, ["t"]).unwrap();
        assert_eq!(extract.rows("t").len(), 2);
        assert_eq!(extract.stats.scan.statements, 2);
    }
}
