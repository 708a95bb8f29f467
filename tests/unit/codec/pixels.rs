use super::*;

#[test]
fn from_raw_checks_length() {
    PixelBuffer::from_raw(2, 1, vec![0; 8]).unwrap();
    assert!(matches!(
        PixelBuffer::from_raw(2, 2, vec![0; 8]),
        Err(PimgError::Validation(_))
    ));
}

#[test]
fn filled_and_from_fn_layout_is_row_major() {
    let buf = PixelBuffer::filled(3, 2, [1, 2, 3, 4]);
    assert_eq!(buf.as_raw().len(), 24);
    assert_eq!(buf.pixel(2, 1), Some([1, 2, 3, 4]));
    assert_eq!(buf.pixel(3, 0), None);
    assert_eq!(buf.pixel(0, 2), None);

    let buf = PixelBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 0, 255]);
    assert_eq!(buf.pixel(2, 0), Some([2, 0, 0, 255]));
    assert_eq!(buf.pixel(1, 1), Some([1, 1, 0, 255]));
    assert_eq!(&buf.as_raw()[12..16], &[0, 1, 0, 255]);
}

#[test]
fn rows_and_alphas() {
    let mut buf = PixelBuffer::from_fn(4, 2, |x, y| [x as u8, y as u8, 0, (x * 10) as u8]);
    assert_eq!(buf.row(1, 1, 3), &[1, 1, 0, 10, 2, 1, 0, 20]);

    buf.row_mut(0, 3, 4).copy_from_slice(&[9, 9, 9, 9]);
    assert_eq!(buf.pixel(3, 0), Some([9, 9, 9, 9]));

    let alphas: Vec<u8> = buf.alphas().collect();
    assert_eq!(alphas, vec![0, 10, 20, 9, 0, 10, 20, 30]);
}
