fn main() {
    #[cfg(target_os = "windows")]
    {
        let mut res = winres::WindowsResource::new();
        res.set("ProductName", "Flame Analysis");
        res.set("FileDescription", "Spectrometer measurement viewer");
        res.compile().expect("Failed to compile Windows resources");
    }
}
