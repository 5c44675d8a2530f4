use super::*;

#[test]
fn resolution_parses_and_displays() {
    let r: Resolution = "1280x720".parse().unwrap();
    assert_eq!(r.dimensions(), Dimensions::new(1280, 720));
    assert_eq!(r.to_string(), "1280x720");
    assert_eq!(" 640 X 480 ".parse::<Resolution>().unwrap(), Resolution::default());
}

#[test]
fn resolution_rejects_garbage_and_zero() {
    assert!("1280".parse::<Resolution>().is_err());
    assert!("ax720".parse::<Resolution>().is_err());
    assert!("0x720".parse::<Resolution>().is_err());
}

#[test]
fn resolution_serde_uses_string_form() {
    let r = Resolution::new(1920, 1080).unwrap();
    let s = serde_json::to_string(&r).unwrap();
    assert_eq!(s, "\"1920x1080\"");
    let back: Resolution = serde_json::from_str(&s).unwrap();
    assert_eq!(back, r);
    assert!(serde_json::from_str::<Resolution>("\"nope\"").is_err());
}

#[test]
fn color_hex_roundtrip() {
    let c: Rgb8 = "#00ffff".parse().unwrap();
    assert_eq!(c, Rgb8::CYAN);
    assert_eq!(Rgb8::new(18, 52, 86).to_string(), "#123456");
    assert!("#12345".parse::<Rgb8>().is_err());
    assert!("#gg0000".parse::<Rgb8>().is_err());
}

#[test]
fn dimensions_u16_conversion_is_checked() {
    assert_eq!(Dimensions::new(640, 480).to_u16().unwrap(), (640, 480));
    assert!(Dimensions::new(70_000, 10).to_u16().is_err());
    assert!(Dimensions::new(0, 10).is_empty());
}
