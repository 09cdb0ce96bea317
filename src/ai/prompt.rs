//! System instruction and response schema for the recommendation model

use crate::session::settings::UserSettings;
use serde_json::{json, Value};

const INSTRUCTION: &str = r#"You are an assistant for a Vietnamese café recommendation chatbot. Your task is to provide high-quality, structured data.

Respond with a single structured JSON object containing two keys: "summary" and "places". Do not include any text outside of this JSON object.

1. "summary" (the chat message):
   - A friendly, human-readable list summarizing the recommended cafés in Vietnamese.
   - Start with an intro sentence, e.g. "Dưới đây là vài quán cà phê phù hợp với yêu cầu của bạn:".
   - List each place using a numbered emoji format (1️⃣, 2️⃣, 3️⃣...).
   - CRITICAL: wrap the name of each café in double asterisks (e.g. "**The Coffee House**"), spelled exactly as its "name" in "places". This makes it clickable in the UI.
   - After the name, include a short, single-line summary of its main highlight.

2. "places" (the map data): a JSON array of 5-10 recommended café objects, each with:
   - name: the café's name.
   - address: the full address.
   - latitude, longitude: accurate coordinates within the user's requested area in Vietnam.
   - rating: a number between 4.0 and 5.0.
   - review_count: an estimated number of reviews.
   - reason: 2-3 bullet points (using "- " and "\n") explaining in Vietnamese why it is recommended.
   - images: 1-3 real, publicly accessible image URLs (generic coffee shop photos from unsplash.com or pexels.com are acceptable). Do not invent URLs.
   - source: "Google Maps" or "OpenStreetMap".
   - confidence: a float between 0.0 and 1.0.

Rules:
- Results must match the user's preferences (style, budget, distance).
- Prefer highly rated or popular places.
- Escape any double quotes inside string values with a backslash."#;

/// Build the system instruction, embedding the user's context
pub fn system_instruction(settings: &UserSettings) -> String {
    let coordinates = settings
        .coordinates
        .map(|c| format!("{}, {}", c.lat, c.lng))
        .unwrap_or_else(|| "Not available".to_string());

    format!(
        "{INSTRUCTION}\n\n🗺️ User's context:\n\
         - User location text: {}\n\
         - User's coordinates: {}\n\
         - Preferred styles/types: {}\n\
         - Price range: {}\n\
         - Max distance: {} km\n",
        settings.location,
        coordinates,
        settings.food_types,
        settings.price_range.label(),
        settings.distance_km,
    )
}

/// JSON schema the model's output must follow
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "A short, friendly summary of the recommendations in Vietnamese."
            },
            "places": {
                "type": "ARRAY",
                "description": "A list of recommended coffee shop objects.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Tên của quán cà phê." },
                        "address": { "type": "STRING", "description": "Địa chỉ đầy đủ, bao gồm số nhà, đường, quận, và thành phố." },
                        "latitude": { "type": "NUMBER", "description": "Vĩ độ địa lý." },
                        "longitude": { "type": "NUMBER", "description": "Kinh độ địa lý." },
                        "rating": { "type": "NUMBER", "description": "Điểm đánh giá trung bình, từ 0 đến 5." },
                        "review_count": { "type": "NUMBER", "description": "Số lượng đánh giá." },
                        "price_range": { "type": "STRING", "description": "Khoảng giá, ví dụ: \"30,000đ - 70,000đ\"." },
                        "opening_hours": { "type": "STRING", "description": "Giờ mở cửa, ví dụ: \"07:00 - 22:00\"." },
                        "reason": { "type": "STRING", "description": "Lý do đề xuất, định dạng gạch đầu dòng với \\n." },
                        "popular_reviews": { "type": "ARRAY", "items": { "type": "STRING" }, "description": "Một hoặc hai đánh giá tiêu biểu của người dùng." },
                        "images": { "type": "ARRAY", "items": { "type": "STRING" }, "description": "Link URL hình ảnh của quán." },
                        "source": { "type": "STRING", "description": "Nguồn dữ liệu, ví dụ: \"Google Maps\"." },
                        "confidence": { "type": "NUMBER", "description": "Độ tin cậy của gợi ý, từ 0.0 đến 1.0." }
                    },
                    "required": ["name", "address", "latitude", "longitude", "reason", "images"]
                }
            }
        },
        "required": ["summary", "places"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;
    use crate::session::settings::PriceRange;

    #[test]
    fn test_instruction_embeds_context() {
        let settings = UserSettings {
            price_range: PriceRange::Budget,
            distance_km: 3,
            ..UserSettings::default()
        };
        let text = system_instruction(&settings);

        assert!(text.contains("- User location text: Quận 1, TP.HCM"));
        assert!(text.contains("- User's coordinates: Not available"));
        assert!(text.contains("- Price range: Bình dân"));
        assert!(text.contains("- Max distance: 3 km"));
    }

    #[test]
    fn test_instruction_with_coordinates() {
        let settings = UserSettings::default().with_coordinates(Some(Coordinates::new(10.5, 106.25)));
        assert!(system_instruction(&settings).contains("- User's coordinates: 10.5, 106.25"));
    }

    #[test]
    fn test_schema_required_fields() {
        let schema = response_schema();
        assert_eq!(schema["required"], json!(["summary", "places"]));
        let required = schema["properties"]["places"]["items"]["required"]
            .as_array()
            .unwrap();
        for field in ["name", "address", "latitude", "longitude", "reason", "images"] {
            assert!(required.contains(&json!(field)), "{} not required", field);
        }
    }
}
