use pretty_assertions::assert_eq;

use shelfmark::types::isbn::*;

#[test]
fn isbn10_checksum() {
    assert!(is_valid_isbn10("0141439513"));
    assert!(!is_valid_isbn10("0141439514"));
    assert!(is_valid_isbn10("080442957X"));
    assert!(is_valid_isbn10("080442957x"));
    assert!(is_valid_isbn10("0-8044-2957-X"));
}

#[test]
fn isbn10_shape() {
    assert!(!is_valid_isbn10("014143951"));
    assert!(!is_valid_isbn10("01414395133"));
    assert!(!is_valid_isbn10("01414X9513"));
    assert!(!is_valid_isbn10("X141439513"));
    assert!(!is_valid_isbn10(""));
}

#[test]
fn isbn13_checksum() {
    assert!(is_valid_isbn13("9780141439518"));
    assert!(!is_valid_isbn13("9780141439519"));
    assert!(is_valid_isbn13("978-0-14-143951-8"));
    assert!(!is_valid_isbn13("978014143951X"));
    assert!(!is_valid_isbn13("978014143951"));
}

#[test]
fn dispatch_on_length() {
    assert!(is_valid_isbn("0141439513"));
    assert!(is_valid_isbn("9780141439518"));
    assert!(!is_valid_isbn("97801414395"));
    assert!(!is_valid_isbn("not an isbn"));
}

#[test]
fn clean() {
    assert_eq!(clean_isbn("0-8044-2957-x"), "080442957X");
    assert_eq!(clean_isbn(" 978 0141 439518\t"), "9780141439518");
    assert_eq!(clean_isbn("9-7-8-0141439518"), "9780141439518");
    for input in ["0-8044-2957-x", " 978 0 14 ", "abc-def", ""] {
        assert_eq!(clean_isbn(&clean_isbn(input)), clean_isbn(input));
    }
}

#[test]
fn isbn10_to_isbn13() {
    assert_eq!(to_isbn13("0141439513").as_deref(), Some("9780141439518"));
    assert_eq!(to_isbn13("0-8044-2957-X").as_deref(), Some("9780804429573"));
    assert_eq!(to_isbn13("0-8044-2957-x").as_deref(), Some("9780804429573"));
}

#[test]
fn isbn13_passes_through() {
    for isbn in ["9780141439518", "9780804429573"] {
        assert_eq!(to_isbn13(isbn).as_deref(), Some(isbn));
    }
    assert_eq!(to_isbn13("978-0-14-143951-8").as_deref(), Some("9780141439518"));
}

#[test]
fn invalid_inputs_do_not_convert() {
    assert_eq!(to_isbn13("9780141439519"), None);
    assert_eq!(to_isbn13("0141439514"), None);
    assert_eq!(to_isbn13("12345"), None);
    assert_eq!(to_isbn13(""), None);
}

#[test]
fn every_converted_isbn10_is_a_valid_isbn13() {
    for isbn10 in ["0141439513", "080442957X", "0306406152", "0451524934"] {
        let isbn13 = to_isbn13(isbn10).expect("valid ISBN-10");
        assert!(is_valid_isbn13(&isbn13), "{isbn13}");
        assert_eq!(&isbn13[..12], format!("978{}", &isbn10[..9]));
    }
}
