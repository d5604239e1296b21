//! Reporter port - 利用者向けの出力（WP-CLI の log / warning / success 相当）

/// Reporter は進捗と結果を利用者に伝える
///
/// 致命的エラーの表示は呼び出し側（CLI）が行うため、ここには含めない。
pub trait Reporter: Send + Sync {
    fn notice(&self, message: &str);

    fn warning(&self, message: &str);

    fn success(&self, message: &str);
}
