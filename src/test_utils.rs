use std::fmt::Debug;


/// Panics with a readable dump of both byte buffers. Text is printed as is,
/// binary data as hex rows. The actual data is also written to `dump.bin`.
pub(crate) fn file_failure(actual: &[u8], expected: &[u8], filename: &str) {
    use std::fmt::Write;

    let mut msg = String::new();

    writeln!(msg, "===== Expected data ('{}')", filename).unwrap();
    write_data(&mut msg, expected);
    writeln!(msg).unwrap();

    writeln!(msg, "===== Actual data (written to 'dump.bin')").unwrap();
    std::fs::write("dump.bin", actual).expect("failed to dump actual data");
    write_data(&mut msg, actual);

    panic!("assertion failed: \n{}", msg);

    fn write_data(msg: &mut String, data: &[u8]) {
        match std::str::from_utf8(data) {
            Ok(s) if !data.contains(&0) => writeln!(msg, "{}", s).unwrap(),
            _ => {
                for chunk in data.chunks(32) {
                    for b in chunk {
                        write!(msg, "{:02x} ", b).unwrap();
                    }
                    writeln!(msg).unwrap();
                }
            }
        }
    }
}

/// Compares the given bytes with a file from the `test_files/` directory
/// next to the calling module.
macro_rules! assert_eq_file {
    ($actual:expr, $filename:expr) => {
        let actual = $actual as &[u8];
        let expected = include_bytes!(concat!("test_files/", $filename)) as &[u8];
        if actual != expected {
            crate::test_utils::file_failure(actual, expected, $filename);
        }
    }
}

/// Returns a `Cursor` over a file from the `test_files/` directory next to the
/// calling module.
macro_rules! include_test_file {
    ($filename:expr) => {{
        let bytes = include_bytes!(concat!("test_files/", $filename)) as &[u8];
        std::io::Cursor::new(bytes)
    }}
}

/// Asserts that two sequences of floats are equal up to `eps`.
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr) => {
        assert_approx_eq!($left, $right, 1e-6)
    };
    ($left:expr, $right:expr, $eps:expr) => {
        crate::test_utils::assert_approx_eq_fn(
            &$left[..],
            &$right[..],
            $eps,
            file!(),
            line!(),
            column!(),
        )
    };
}

#[inline(never)]
pub fn assert_approx_eq_fn<T>(left: &[T], right: &[T], eps: f64, file: &str, line: u32, col: u32)
where
    T: Debug + Copy + Into<f64>,
{
    let equal = left.len() == right.len()
        && left.iter().zip(right).all(|(&l, &r)| (l.into() - r.into()).abs() <= eps);

    if !equal {
        panic!(
            "assert_approx_eq failed (eps = {}):\n  left: `{:?}`, \n right: `{:?}`\nAt: {}:{}:{}",
            eps,
            left,
            right,
            file,
            line,
            col,
        )
    }
}
