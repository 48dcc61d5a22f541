use rand::Rng;

const PROMO_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 生成8位大写字母数字促销码（去掉易混淆的 0/O/1/I）
pub fn generate_promo_code() -> String {
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| PROMO_CHARSET[rng.gen_range(0..PROMO_CHARSET.len())] as char)
        .collect()
}

/// 新建商品的主键
pub fn generate_product_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_promo_code() {
        let code = generate_promo_code();
        assert_eq!(code.len(), 8);
        assert!(code.bytes().all(|c| PROMO_CHARSET.contains(&c)));
        assert_eq!(code, code.to_uppercase());
    }

    #[test]
    fn test_generate_product_id_is_unique() {
        let a = generate_product_id();
        let b = generate_product_id();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
