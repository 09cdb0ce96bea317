//! Centralized constants for the cafe-scout crate
//!
//! Values shared by several modules: endpoints, user-facing Vietnamese copy,
//! and map defaults.

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// Google Generative Language API (Gemini)
    pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
}

/// Location handling
pub mod location {
    /// Settings location text used once device geolocation has succeeded
    pub const CURRENT_LOCATION: &str = "Vị trí hiện tại của bạn";

    /// Bounding box covering Vietnam (west,north,east,south)
    pub const VIETNAM_VIEWBOX: &str = "102.14,23.39,109.46,8.18";
}

/// Map camera defaults
pub mod map {
    /// Ho Chi Minh City center, used before any coordinates are known
    pub const DEFAULT_CENTER: (f64, f64) = (10.7769, 106.7009);

    /// Zoom used for the initial and fallback views
    pub const DEFAULT_ZOOM: u8 = 14;

    /// Zoom used when flying to a selected place
    pub const FOCUS_ZOOM: u8 = 16;

    /// Relative padding applied when framing all markers
    pub const FIT_PADDING: f64 = 0.2;
}

/// Chat copy shown to the user
pub mod messages {
    /// Id of the opening greeting, which is never sent to the AI as history
    pub const GREETING_ID: &str = "initial-ai-message";

    pub const GREETING: &str = "Chào bạn! Bạn muốn tìm một quán cà phê ưng ý ở Việt Nam hôm nay? ☕ Để có gợi ý tốt nhất, hãy cho phép mình truy cập vị trí của bạn nhé!";

    /// Used when the AI returns an empty summary
    pub const SUMMARY_FALLBACK: &str = "Tuyệt vời! Dưới đây là một vài gợi ý quán cà phê phù hợp với bạn. Hãy xem trên bản đồ nhé!";

    pub const NETWORK_FAILURE: &str =
        "Xin lỗi, mình đang gặp chút sự cố. Bạn vui lòng thử lại sau nhé! 😥";

    pub const MALFORMED_RESPONSE: &str = "Xin lỗi, mình gặp sự cố khi xử lý dữ liệu từ AI. Có thể định dạng trả về không đúng. Bạn thử lại nhé.";

    pub const MISSING_CREDENTIAL: &str = "Xin lỗi, dịch vụ gợi ý chưa được cấu hình khóa API (thiếu biến môi trường chứa khóa). Vui lòng liên hệ quản trị viên.";
}
