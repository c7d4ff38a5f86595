use verse_packs::normalize::{self, Language};
use verse_packs::reference;

#[test]
fn citations_round_trip_through_display() {
    let cases = [
        "Genesis 1:1",
        "1 Samuel 3:4",
        "Song of Solomon 2:1",
        "John 1:1-5",
        "3 John 1:14",
        "Psalms 119:105-112",
    ];
    for c in cases {
        let r = reference::parse(c).unwrap();
        assert_eq!(r.to_string(), c);
        let again = reference::parse(&r.to_string()).unwrap();
        assert_eq!(again, r);
    }
}

#[test]
fn range_bounds() {
    let r = reference::parse("Romans 8:28-39").unwrap();
    assert_eq!((r.chapter, r.verse_start, r.verse_end), (8, 28, 39));
    let single = reference::parse("Romans 8:28").unwrap();
    assert_eq!(single.verse_end, single.verse_start);
}

#[test]
fn strongs_numbers() {
    assert_eq!(normalize::strongs("b/7225", Language::Hebrew), "H7225");
    assert_eq!(normalize::strongs("strong:G25", Language::Greek), "G0025");
    assert_eq!(normalize::strongs("x-punct", Language::Hebrew), "");
}

#[test]
fn normalized_text_is_a_fixed_point() {
    for s in ["In the beginning God created", "καὶ ὁ λόγος ἦν πρὸς τὸν θεόν", "ראשית"] {
        let once = normalize::text(s);
        assert_eq!(normalize::text(&once), once);
    }
    assert_eq!(normalize::text("In the beginning God created"), "In the beginning God created");
}
