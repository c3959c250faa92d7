fn main() {
    uniffi::generate_scaffolding("src/laudo.udl").unwrap();
}
