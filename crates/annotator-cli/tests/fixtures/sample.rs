fn main() {
    // TODO: remove unwrap
    let v: Option<u8> = None;
    v.unwrap();
}
