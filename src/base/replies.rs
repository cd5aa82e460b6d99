//! Canned message templates.

/// Reply sent for store-information enquiries (hours, location, links).
pub const STORE_INFO_REPLY: &str = r#####"お問い合わせありがとうございます！

【基本営業時間】
22:00 〜 翌05:00

【場所】
https://maps.app.goo.gl/oVTnjvmxomGJi98S7

────────────────
▼公式サイト
https://osaka.gala-resort.jp/

▼公式Instagram
https://www.instagram.com/gala.resort/
────────────────

ご不明点があればお気軽にご連絡ください！"#####;

/// Build the staff alert for a VIP / reservation message.
pub fn vip_alert(message: &str) -> String {
    format!("【VIP／予約DM】\n内容：{message}\n対応：スタッフ対応必要")
}
