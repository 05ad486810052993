use serde::Deserialize;
use serde_json::{Map, Value};

pub const COL_VIDEO_ID: &str = "Video ID";
pub const COL_VIDEO_INFO: &str = "Video Info";
pub const COL_TIME: &str = "Time";
pub const COL_CREATOR: &str = "Creator name";
pub const COL_PRODUCTS: &str = "Products";
pub const COL_VV: &str = "VV";
pub const COL_LIKES: &str = "Likes";
pub const COL_COMMENTS: &str = "Comments";
pub const COL_SHARES: &str = "Shares";
pub const COL_NEW_FOLLOWERS: &str = "New followers";
pub const COL_V_TO_L_CLICKS: &str = "V-to-L clicks";
pub const COL_PRODUCT_IMPRESSIONS: &str = "Product Impressions";
pub const COL_PRODUCT_CLICKS: &str = "Product Clicks";
pub const COL_BUYERS: &str = "Buyers";
pub const COL_ORDERS: &str = "Orders";
pub const COL_UNIT_SALES: &str = "Unit Sales";
pub const COL_VIDEO_REVENUE: &str = "Video Revenue ($)";
pub const COL_GPM: &str = "GPM ($)";
pub const COL_ATTRIBUTED_GMV: &str = "Shoppable video attributed GMV ($)";
pub const COL_CTR: &str = "CTR";
pub const COL_V_TO_L_RATE: &str = "V-to-L rate";
pub const COL_FINISH_RATE: &str = "Video Finish Rate";
pub const COL_CTOR: &str = "CTOR";

/// Every column a snapshot row must carry. `Video ID` and `VV` come first so
/// a file missing them reports those columns before anything else.
pub const REQUIRED_COLUMNS: [&str; 23] = [
    COL_VIDEO_ID,
    COL_VV,
    COL_VIDEO_INFO,
    COL_TIME,
    COL_CREATOR,
    COL_PRODUCTS,
    COL_LIKES,
    COL_COMMENTS,
    COL_SHARES,
    COL_NEW_FOLLOWERS,
    COL_V_TO_L_CLICKS,
    COL_PRODUCT_IMPRESSIONS,
    COL_PRODUCT_CLICKS,
    COL_BUYERS,
    COL_ORDERS,
    COL_UNIT_SALES,
    COL_VIDEO_REVENUE,
    COL_GPM,
    COL_ATTRIBUTED_GMV,
    COL_CTR,
    COL_V_TO_L_RATE,
    COL_FINISH_RATE,
    COL_CTOR,
];

/// A snapshot document as it arrives on disk: the export's date-range
/// header plus rows keyed by column header.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSnapshot {
    pub date_range: String,
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
}
