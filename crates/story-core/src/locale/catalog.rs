//! Message catalogs.

use std::collections::{BTreeMap, HashMap};

use super::Locale;

const ID_MESSAGES: &[(&str, &str)] = &[
    ("app-title", "Aplikasi Cerita"),
    ("dashboard", "Beranda"),
    ("add-story", "Tambah Cerita"),
    ("about", "Tentang"),
    ("login", "Masuk"),
    ("logout", "Keluar"),
    ("register", "Daftar"),
    ("description", "Deskripsi"),
    ("photo", "Foto"),
    ("select-photo", "Pilih foto"),
    ("drag-drop-hint", "Seret dan lepas foto di sini, maksimal 1MB"),
    ("form-description-placeholder", "Ceritakan kisahmu..."),
    ("form-description-required", "Deskripsi wajib diisi"),
    ("form-photo-required", "Foto wajib dipilih"),
    ("form-photo-invalid-type", "Pilih file gambar yang valid"),
    ("form-photo-too-large", "Ukuran gambar harus kurang dari 1MB"),
    ("form-name-too-short", "Nama minimal 2 karakter"),
    ("form-email-invalid", "Masukkan alamat email yang valid"),
    ("form-email-required", "Email wajib diisi"),
    ("form-password-required", "Kata sandi wajib diisi"),
    ("form-password-too-short", "Kata sandi minimal 8 karakter"),
    ("form-password-requirements", "Kata sandi belum memenuhi semua persyaratan"),
    ("cancel", "Batal"),
    ("submit", "Kirim"),
    ("login-success", "Berhasil masuk!"),
    ("logout-success", "Berhasil keluar."),
    ("register-success", "Akun berhasil dibuat! Silakan masuk untuk melanjutkan."),
    ("story-added", "Cerita berhasil ditambahkan!"),
    ("login-required", "Silakan masuk untuk menambahkan cerita"),
    ("no-stories", "Belum ada cerita."),
    ("submission-in-progress", "Permintaan sebelumnya masih diproses"),
    ("subscribed", "Berlangganan notifikasi berhasil"),
    ("unsubscribed", "Berhenti berlangganan notifikasi berhasil"),
];

const EN_MESSAGES: &[(&str, &str)] = &[
    ("app-title", "Story App"),
    ("dashboard", "Dashboard"),
    ("add-story", "Add Story"),
    ("about", "About"),
    ("login", "Login"),
    ("logout", "Logout"),
    ("register", "Register"),
    ("description", "Description"),
    ("photo", "Photo"),
    ("select-photo", "Select a photo"),
    ("drag-drop-hint", "Drag and drop a photo here, max 1MB"),
    ("form-description-placeholder", "Tell your story..."),
    ("form-description-required", "Description is required"),
    ("form-photo-required", "Photo is required"),
    ("form-photo-invalid-type", "Please select a valid image file"),
    ("form-photo-too-large", "Image size must be less than 1MB"),
    ("form-name-too-short", "Name must be at least 2 characters long"),
    ("form-email-invalid", "Please enter a valid email address"),
    ("form-email-required", "Email is required"),
    ("form-password-required", "Password is required"),
    ("form-password-too-short", "Password must be at least 8 characters long"),
    ("form-password-requirements", "Password does not meet all requirements"),
    ("cancel", "Cancel"),
    ("submit", "Submit"),
    ("login-success", "Login successful!"),
    ("logout-success", "Logged out."),
    ("register-success", "Account created successfully! Please login to continue."),
    ("story-added", "Story added successfully!"),
    ("login-required", "Please login to add a story"),
    ("no-stories", "No stories yet."),
    ("submission-in-progress", "A previous request is still in progress"),
    ("subscribed", "Subscribed to notifications"),
    ("unsubscribed", "Unsubscribed from notifications"),
];

/// Looks `key` up in the bundled catalog for `locale`.
pub fn builtin_message(locale: Locale, key: &str) -> Option<&'static str> {
    let table = match locale {
        Locale::Id => ID_MESSAGES,
        Locale::En => EN_MESSAGES,
    };
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, message)| *message)
}

/// Registered messages per locale.
///
/// A locale is supported iff it has a catalog here.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: HashMap<Locale, BTreeMap<String, String>>,
}

impl Catalog {
    /// Empty catalog; no locale is supported until one is registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled `id` and `en` catalogs.
    pub fn builtin() -> Self {
        Self::new()
            .with(Locale::Id, ID_MESSAGES.iter().copied())
            .with(Locale::En, EN_MESSAGES.iter().copied())
    }

    /// Registers (or extends) the catalog for `locale`.
    #[must_use]
    pub fn with<K, V>(mut self, locale: Locale, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let table = self.messages.entry(locale).or_default();
        table.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn supports(&self, locale: Locale) -> bool {
        self.messages.contains_key(&locale)
    }

    pub fn lookup(&self, locale: Locale, key: &str) -> Option<&str> {
        self.messages
            .get(&locale)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_builtin_catalogs_share_keys() {
        let id: BTreeSet<_> = ID_MESSAGES.iter().map(|(k, _)| *k).collect();
        let en: BTreeSet<_> = EN_MESSAGES.iter().map(|(k, _)| *k).collect();
        assert_eq!(id, en);
    }

    #[test]
    fn test_empty_catalog_supports_nothing() {
        let catalog = Catalog::new();
        assert!(!catalog.supports(Locale::Id));
        assert_eq!(catalog.lookup(Locale::Id, "login"), None);
    }

    #[test]
    fn test_with_extends_existing_table() {
        let catalog = Catalog::new()
            .with(Locale::En, [("a", "1")])
            .with(Locale::En, [("b", "2")]);
        assert_eq!(catalog.lookup(Locale::En, "a"), Some("1"));
        assert_eq!(catalog.lookup(Locale::En, "b"), Some("2"));
    }
}
