use crate::entities::{DiscountType, discount_entity as discounts, product_entity as products};
use crate::error::AppResult;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveValue::Set, ConnectionTrait, EntityTrait, QuerySelect};

const DEFAULT_SEED_STOCK: i32 = 25;

struct SeedProduct {
    id: &'static str,
    title: &'static str,
    price: i64,
    category: &'static str,
    section: &'static str,
    subcategory: &'static str,
    image: &'static str,
    description: &'static str,
    sizes: &'static [&'static str],
    colors: &'static [&'static str],
    is_new: bool,
}

const STARTER_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        id: "w1",
        title: "Faroo \"Noor\" Embroidered Tunic",
        price: 4500,
        category: "Women",
        section: "women",
        subcategory: "Tunics",
        image: "/products/women-tunic-6.jpg",
        description: "Intricately embroidered mint green tunic with premium finishing.",
        sizes: &["S", "M", "L", "XL"],
        colors: &["Mint Green"],
        is_new: true,
    },
    SeedProduct {
        id: "w2",
        title: "Faroo \"Maya\" Floral Kurti Set",
        price: 3200,
        category: "Women",
        section: "women",
        subcategory: "Tunics",
        image: "/products/women-tunic-2.jpg",
        description: "White kurti set with delicate floral prints and matching trousers.",
        sizes: &["S", "M", "L", "XL"],
        colors: &["White/Floral"],
        is_new: false,
    },
    SeedProduct {
        id: "w3",
        title: "Faroo \"Zara\" Pearl Sleeve Tunic",
        price: 4200,
        category: "Women",
        section: "women",
        subcategory: "Tunics",
        image: "/products/women-tunic-3.jpg",
        description: "Soft pink tunic with statement sleeves and hand-stitched pearls.",
        sizes: &["S", "M", "L", "XL"],
        colors: &["Pink"],
        is_new: false,
    },
    SeedProduct {
        id: "w4",
        title: "Faroo \"Aura\" Striped Tunic",
        price: 3500,
        category: "Women",
        section: "women",
        subcategory: "Tunics",
        image: "/products/women-tunic-1.jpg",
        description: "Blue and white striped tunic for daily wear.",
        sizes: &["S", "M", "L", "XL"],
        colors: &["Blue/White"],
        is_new: false,
    },
    SeedProduct {
        id: "w6",
        title: "Faroo \"Iris\" Color Block Sweater",
        price: 2900,
        category: "Women",
        section: "women",
        subcategory: "Sweaters",
        image: "/products/women-sweater-4.jpg",
        description: "Color-block knit sweater in beige, pink and brown.",
        sizes: &["S", "M", "L"],
        colors: &["Multi"],
        is_new: true,
    },
    SeedProduct {
        id: "w8",
        title: "Faroo Cable Knit Cardigan",
        price: 3500,
        category: "Women",
        section: "women",
        subcategory: "Cardigans",
        image: "/products/women-cardigan-1.jpg",
        description: "Black cable-knit cardigan with an adjustable waist belt.",
        sizes: &["S", "M", "L"],
        colors: &["Black"],
        is_new: false,
    },
    SeedProduct {
        id: "m1",
        title: "Faroo \"Rayaan\" Premium Panjabi",
        price: 4500,
        category: "Men",
        section: "men",
        subcategory: "Panjabi",
        image: "/products/men-shirt-placeholder.png",
        description: "Fine cotton panjabi with self-embroidery on the collar.",
        sizes: &["S", "M", "L", "XL", "XXL"],
        colors: &["White", "Off-White"],
        is_new: true,
    },
    SeedProduct {
        id: "m2",
        title: "Faroo \"Irfan\" Silk Kurta",
        price: 5200,
        category: "Men",
        section: "men",
        subcategory: "Kurta",
        image: "/products/men-shirt-placeholder.png",
        description: "Semi-silk festive kurta.",
        sizes: &["M", "L", "XL", "XXL"],
        colors: &["Deep Blue", "Royal Maroon"],
        is_new: false,
    },
    SeedProduct {
        id: "m5",
        title: "Faroo \"Zayn\" Linen Casual Shirt",
        price: 2800,
        category: "Men",
        section: "men",
        subcategory: "Shirts",
        image: "/products/men-shirt-placeholder.png",
        description: "Breathable linen shirt for warm weather.",
        sizes: &["S", "M", "L", "XL"],
        colors: &["Sage Green", "White"],
        is_new: false,
    },
    SeedProduct {
        id: "m9",
        title: "Faroo \"Hadi\" Slim Chinos",
        price: 3500,
        category: "Men",
        section: "men",
        subcategory: "Pants",
        image: "/products/men-pants-placeholder.png",
        description: "Slim-fit chinos in stretch cotton twill.",
        sizes: &["30", "32", "34", "36"],
        colors: &["Khaki", "Navy"],
        is_new: false,
    },
];

struct SeedDiscount {
    code: &'static str,
    discount_type: DiscountType,
    value: i64,
    description: &'static str,
    // 有效期：从种子写入时起算的天数
    valid_days: i64,
    min_purchase: Option<i64>,
    max_discount: Option<i64>,
    usage_count: i32,
    max_usage: Option<i32>,
}

const STARTER_DISCOUNTS: &[SeedDiscount] = &[
    SeedDiscount {
        code: "WELCOME10",
        discount_type: DiscountType::Percentage,
        value: 10,
        description: "Welcome discount for new customers",
        valid_days: 365,
        min_purchase: Some(2000),
        max_discount: None,
        usage_count: 45,
        max_usage: Some(1000),
    },
    SeedDiscount {
        code: "WINTER25",
        discount_type: DiscountType::Percentage,
        value: 25,
        description: "Winter sale - 25% off",
        valid_days: 90,
        min_purchase: Some(5000),
        max_discount: Some(2000),
        usage_count: 123,
        max_usage: None,
    },
    SeedDiscount {
        code: "FLAT500",
        discount_type: DiscountType::Fixed,
        value: 500,
        description: "Flat ৳500 off on orders above ৳3000",
        valid_days: 60,
        min_purchase: Some(3000),
        max_discount: None,
        usage_count: 67,
        max_usage: None,
    },
];

fn json_list(values: &[&str]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

fn product_model(seed: &SeedProduct, now: DateTime<Utc>) -> products::ActiveModel {
    products::ActiveModel {
        id: Set(seed.id.to_string()),
        sku: Set(None),
        title: Set(seed.title.to_string()),
        price: Set(seed.price),
        category: Set(seed.category.to_string()),
        section: Set(seed.section.to_string()),
        subcategory: Set(seed.subcategory.to_string()),
        image: Set(seed.image.to_string()),
        images: Set(json_list(&[seed.image])),
        description: Set(Some(seed.description.to_string())),
        sizes: Set(json_list(seed.sizes)),
        colors: Set(json_list(seed.colors)),
        stock: Set(DEFAULT_SEED_STOCK),
        is_new: Set(seed.is_new),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

fn discount_model(seed: &SeedDiscount, now: DateTime<Utc>) -> discounts::ActiveModel {
    discounts::ActiveModel {
        code: Set(seed.code.to_string()),
        discount_type: Set(seed.discount_type),
        value: Set(seed.value),
        description: Set(seed.description.to_string()),
        valid_from: Set(now),
        valid_until: Set(now + Duration::days(seed.valid_days)),
        min_purchase: Set(seed.min_purchase),
        max_discount: Set(seed.max_discount),
        active: Set(true),
        usage_count: Set(seed.usage_count),
        max_usage: Set(seed.max_usage),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

async fn seed_products<C>(db: &C, now: DateTime<Utc>) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    let existing: Vec<String> = products::Entity::find()
        .select_only()
        .column(products::Column::Id)
        .into_tuple()
        .all(db)
        .await?;

    let missing: Vec<_> = STARTER_PRODUCTS
        .iter()
        .filter(|p| !existing.iter().any(|id| id == p.id))
        .map(|p| product_model(p, now))
        .collect();

    if missing.is_empty() {
        return Ok(0);
    }

    let inserted = products::Entity::insert_many(missing)
        .exec_without_returning(db)
        .await?;
    Ok(inserted)
}

async fn seed_discounts<C>(db: &C, now: DateTime<Utc>) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    let existing: Vec<String> = discounts::Entity::find()
        .select_only()
        .column(discounts::Column::Code)
        .into_tuple()
        .all(db)
        .await?;

    let missing: Vec<_> = STARTER_DISCOUNTS
        .iter()
        .filter(|d| !existing.iter().any(|code| code.eq_ignore_ascii_case(d.code)))
        .map(|d| discount_model(d, now))
        .collect();

    if missing.is_empty() {
        return Ok(0);
    }

    let inserted = discounts::Entity::insert_many(missing)
        .exec_without_returning(db)
        .await?;
    Ok(inserted)
}

/// 写入初始商品与促销码，已存在的 id / code 保持不变
pub async fn seed_catalog<C>(db: &C) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let products = seed_products(db, now).await?;
    let discounts = seed_discounts(db, now).await?;
    log::info!(
        "Seeded catalog: {} new products, {} new discounts",
        products,
        discounts
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn id_row(column: &'static str, v: &str) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([(column, Value::String(Some(Box::new(v.to_string()))))])
    }

    #[test]
    fn test_product_model_lists_are_json() {
        let model = product_model(&STARTER_PRODUCTS[0], Utc::now());
        assert_eq!(model.sizes.unwrap(), r#"["S","M","L","XL"]"#);
        assert_eq!(model.images.unwrap(), r#"["/products/women-tunic-6.jpg"]"#);
        assert_eq!(model.stock.unwrap(), DEFAULT_SEED_STOCK);
    }

    #[test]
    fn test_starter_discounts_are_currently_valid() {
        let now = Utc::now();
        for seed in STARTER_DISCOUNTS {
            let model = discount_model(seed, now);
            assert!(model.valid_until.unwrap() > now);
            assert!(model.active.unwrap());
        }
    }

    #[tokio::test]
    async fn test_seed_skips_existing_rows() {
        let product_rows: Vec<_> = STARTER_PRODUCTS
            .iter()
            .skip(1)
            .map(|p| id_row("id", p.id))
            .collect();
        let discount_rows: Vec<_> = ["welcome10", "WINTER25", "FLAT500"]
            .iter()
            .map(|c| id_row("code", c))
            .collect();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([product_rows])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([discount_rows])
            .into_connection();

        let now = Utc::now();
        assert_eq!(seed_products(&db, now).await.unwrap(), 1);
        assert_eq!(seed_discounts(&db, now).await.unwrap(), 0);
    }
}
