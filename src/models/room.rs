use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Physical, // P
    Virtual,  // V
}

impl RoomType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RoomType::Physical => "physical",
            RoomType::Virtual => "virtual",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "physical" => Some(RoomType::Physical),
            "virtual" => Some(RoomType::Virtual),
            _ => None,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "p" => Some(RoomType::Physical),
            "v" => Some(RoomType::Virtual),
            other => RoomType::from_db_str(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VirtualPlatform {
    Zoom,
    Teams,
    Meet,
    Webex,
    Other,
}

impl VirtualPlatform {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            VirtualPlatform::Zoom => "zoom",
            VirtualPlatform::Teams => "teams",
            VirtualPlatform::Meet => "meet",
            VirtualPlatform::Webex => "webex",
            VirtualPlatform::Other => "other",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "zoom" => Some(VirtualPlatform::Zoom),
            "teams" => Some(VirtualPlatform::Teams),
            "meet" => Some(VirtualPlatform::Meet),
            "webex" => Some(VirtualPlatform::Webex),
            "other" => Some(VirtualPlatform::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub room_type: RoomType,
    pub capacity: u32,
    pub building: String,
    pub floor: String,
    pub facilities: String,
    pub platform: Option<VirtualPlatform>,
    pub meeting_link: String,
    pub is_available: bool,
    pub notes: String,
}

impl Room {
    pub fn is_virtual(&self) -> bool {
        self.room_type == RoomType::Virtual
    }

    pub fn label(&self) -> String {
        let kind = match self.room_type {
            RoomType::Physical => "Physical Room",
            RoomType::Virtual => "Virtual Room",
        };
        format!("{} - {} ({})", self.code, self.name, kind)
    }
}
