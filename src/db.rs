use anyhow::Context;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::models::{Case, CaseType, CasesData, Severity};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let cases = vec![
        ("Avery Lee", Case::new(CaseType::FollowUps, "Monday", Severity::B)),
        ("Avery Lee", Case::new(CaseType::Strikes, "Wednesday", Severity::C)),
        ("Jules Moreno", Case::new(CaseType::FollowUps, "Tuesday", Severity::C)),
        ("Kiara Patel", Case::new(CaseType::Strikes, "Friday", Severity::B)),
        ("Kiara Patel", Case::new(CaseType::FollowUps, "Thursday", Severity::B)),
    ];

    for (key, case) in cases {
        upsert_case(pool, key, &case).await?;
    }

    Ok(())
}

pub async fn upsert_case(pool: &PgPool, key: &str, case: &Case) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO case_tracker.cases (id, case_key, case_type, day, severity)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (case_type, case_key) DO UPDATE
        SET day = EXCLUDED.day, severity = EXCLUDED.severity, recorded_at = NOW()
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(key)
    .bind(case.case_type.as_str())
    .bind(&case.day)
    .bind(case.severity.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_case(pool: &PgPool, case_type: CaseType, key: &str) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM case_tracker.cases WHERE case_type = $1 AND case_key = $2")
        .bind(case_type.as_str())
        .bind(key)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn fetch_cases(
    pool: &PgPool,
    bucket: Option<CaseType>,
) -> anyhow::Result<Vec<(String, Case)>> {
    let mut query = String::from(
        "SELECT case_key, case_type, day, severity FROM case_tracker.cases",
    );

    if bucket.is_some() {
        query.push_str(" WHERE case_type = $1");
    }
    query.push_str(" ORDER BY case_type, case_key");

    let mut rows = sqlx::query(&query);

    if let Some(value) = bucket {
        rows = rows.bind(value.as_str());
    }

    let records = rows.fetch_all(pool).await?;
    let mut cases = Vec::new();

    for row in records {
        let key: String = row.get("case_key");
        let case_type: String = row.get("case_type");
        let day: String = row.get("day");
        let severity: String = row.get("severity");
        let case = Case::parse(&case_type, &day, &severity)
            .with_context(|| format!("stored case '{key}' is invalid"))?;
        cases.push((key, case));
    }

    Ok(cases)
}

pub async fn load_cases_data(pool: &PgPool) -> anyhow::Result<CasesData> {
    let mut data = CasesData::default();
    for (key, case) in fetch_cases(pool, None).await? {
        data.insert(key, case);
    }
    Ok(data)
}

/// Inserts rows, leaving cases that already exist untouched.
pub async fn import_cases(pool: &PgPool, cases: &[(String, Case)]) -> anyhow::Result<usize> {
    let mut inserted = 0usize;

    for (key, case) in cases {
        let result = sqlx::query(
            r#"
            INSERT INTO case_tracker.cases (id, case_key, case_type, day, severity)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (case_type, case_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(key)
        .bind(case.case_type.as_str())
        .bind(&case.day)
        .bind(case.severity.as_str())
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Replaces every stored case with the contents of `data` in one transaction.
pub async fn replace_cases(pool: &PgPool, data: &CasesData) -> anyhow::Result<usize> {
    if let Some(mismatch) = data.mismatches().into_iter().next() {
        return Err(mismatch).context("refusing to load a document with misfiled cases");
    }

    let mut tx: Transaction<'_, Postgres> = pool.begin().await?;
    sqlx::query("DELETE FROM case_tracker.cases")
        .execute(&mut *tx)
        .await?;

    for (_, key, case) in data.iter() {
        sqlx::query(
            r#"
            INSERT INTO case_tracker.cases (id, case_key, case_type, day, severity)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(key)
        .bind(case.case_type.as_str())
        .bind(&case.day)
        .bind(case.severity.as_str())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(data.len())
}
