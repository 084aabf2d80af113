//! Player statistics and the floors and caps that guard them.

use serde::{Deserialize, Serialize};

/// Lowest attack value a penalty may leave behind.
pub const MIN_ATTACK: u32 = 1;
/// Lowest attack speed a penalty may leave behind.
pub const MIN_ATTACK_SPEED: f32 = 0.3;
/// Lowest player health a penalty may leave behind.
pub const MIN_PLAYER_HP: u32 = 1;
/// Highest shop discount rate.
pub const MAX_SHOP_DISCOUNT: f32 = 0.5;
/// Highest weapon and skill level.
pub const MAX_STAT_LEVEL: u8 = 5;

/// Player statistics mutated by tile events.
///
/// Every mutator clamps at the mutation site, so no sequence of events can
/// drive a stat below its floor or above its cap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    atk: u32,
    atk_speed: f32,
    crit: f32,
    hp: u32,
    gold: u32,
    shop_discount: f32,
    weapon_level: u8,
    skill_level: u8,
    permanent_dice_bonus: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            atk: 10,
            atk_speed: 1.0,
            crit: 0.1,
            hp: 100,
            gold: 0,
            shop_discount: 0.0,
            weapon_level: 1,
            skill_level: 1,
            permanent_dice_bonus: 0,
        }
    }
}

impl PlayerStats {
    /// Attack value.
    #[must_use]
    pub const fn atk(&self) -> u32 {
        self.atk
    }

    /// Attacks per second.
    #[must_use]
    pub const fn atk_speed(&self) -> f32 {
        self.atk_speed
    }

    /// Critical hit rate.
    #[must_use]
    pub const fn crit(&self) -> f32 {
        self.crit
    }

    /// Player health.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Gold held by the player.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Shop discount rate, never above [`MAX_SHOP_DISCOUNT`].
    #[must_use]
    pub const fn shop_discount(&self) -> f32 {
        self.shop_discount
    }

    /// Weapon level, never above [`MAX_STAT_LEVEL`].
    #[must_use]
    pub const fn weapon_level(&self) -> u8 {
        self.weapon_level
    }

    /// Skill level, never above [`MAX_STAT_LEVEL`].
    #[must_use]
    pub const fn skill_level(&self) -> u8 {
        self.skill_level
    }

    /// Dice added to every refill on top of the base dice.
    #[must_use]
    pub const fn permanent_dice_bonus(&self) -> u32 {
        self.permanent_dice_bonus
    }

    /// Raises attack.
    pub fn raise_atk(&mut self, amount: u32) {
        self.atk = self.atk.saturating_add(amount);
    }

    /// Lowers attack, flooring at [`MIN_ATTACK`].
    pub fn lower_atk(&mut self, amount: u32) {
        self.atk = self.atk.saturating_sub(amount).max(MIN_ATTACK);
    }

    /// Raises attack speed.
    pub fn raise_atk_speed(&mut self, amount: f32) {
        self.atk_speed += amount.max(0.0);
    }

    /// Lowers attack speed, flooring at [`MIN_ATTACK_SPEED`].
    pub fn lower_atk_speed(&mut self, amount: f32) {
        self.atk_speed = (self.atk_speed - amount.max(0.0)).max(MIN_ATTACK_SPEED);
    }

    /// Raises the critical hit rate.
    pub fn raise_crit(&mut self, amount: f32) {
        self.crit += amount.max(0.0);
    }

    /// Raises the shop discount, capping at [`MAX_SHOP_DISCOUNT`].
    pub fn raise_shop_discount(&mut self, amount: f32) {
        self.shop_discount = (self.shop_discount + amount.max(0.0)).min(MAX_SHOP_DISCOUNT);
    }

    /// Restores player health.
    pub fn heal(&mut self, amount: u32) {
        self.hp = self.hp.saturating_add(amount);
    }

    /// Removes player health, flooring at [`MIN_PLAYER_HP`].
    pub fn wound(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount).max(MIN_PLAYER_HP);
    }

    /// Adds gold.
    pub fn earn_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Raises the weapon level by one, capping at [`MAX_STAT_LEVEL`].
    pub fn raise_weapon_level(&mut self) {
        self.weapon_level = self.weapon_level.saturating_add(1).min(MAX_STAT_LEVEL);
    }

    /// Raises the skill level by one, capping at [`MAX_STAT_LEVEL`].
    pub fn raise_skill_level(&mut self) {
        self.skill_level = self.skill_level.saturating_add(1).min(MAX_STAT_LEVEL);
    }

    /// Adds dice granted on every future refill.
    pub fn raise_permanent_dice_bonus(&mut self, amount: u32) {
        self.permanent_dice_bonus = self.permanent_dice_bonus.saturating_add(amount);
    }
}
