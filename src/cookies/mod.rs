pub mod base;
pub mod file_cookies;
pub mod jar_cookies;
pub mod memory_cookies;
pub mod reader;

pub use base::{create_cookie_store, Cookie, CookieStore};
pub use file_cookies::JsonFileCookieStore;
pub use jar_cookies::JarCookieStore;
pub use memory_cookies::MemoryCookieStore;
pub use reader::{normalize_host_url, CookieSyncReader, HostUrls};
